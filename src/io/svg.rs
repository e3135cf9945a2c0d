//! SVG rendering of an arrangement.

use crate::float_types::Real;
use crate::trains::Arrangement;
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Group, Path};

const PALETTE: [&str; 6] = ["#c0392b", "#2980b9", "#27ae60", "#8e44ad", "#d35400", "#2c3e50"];

impl Arrangement {
    /// One `<path>` per loop, grouped per body. The view box is the square
    /// of half-width [`Arrangement::limit`]; y is flipped so that the drawing
    /// keeps the usual mathematical orientation.
    pub fn to_svg(&self, stroke: Real) -> String {
        let limit = self.limit().max(Real::EPSILON) as f32;
        let mut document = Document::new()
            .set("viewBox", (-limit, -limit, 2.0 * limit, 2.0 * limit))
            .set("width", "800")
            .set("height", "800");

        for (i, body) in self.bodies().iter().enumerate() {
            let colour = PALETTE[i % PALETTE.len()];
            let mut group = Group::new()
                .set("id", body.body.to_string())
                .set("transform", "scale(1,-1)");
            for line in body.profile.loops() {
                let mut points = line.0.iter();
                let Some(first) = points.next() else {
                    continue;
                };
                let mut data = Data::new().move_to((first.x as f32, first.y as f32));
                for p in points {
                    data = data.line_to((p.x as f32, p.y as f32));
                }
                let path = Path::new()
                    .set("fill", "none")
                    .set("stroke", colour)
                    .set("stroke-width", stroke as f32)
                    .set("d", data.close());
                group = group.add(path);
            }
            document = document.add(group);
        }
        document.to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::profile::{Circle, ProfileGenerator};
    use crate::trains::{Arrangement, BodyId};
    use crate::transform::translator;

    #[test]
    fn one_path_per_loop() {
        let mut a = Arrangement::new();
        a.place(BodyId::new("hub"), translator(1.0, 0.0), &Circle::new(1.0).generate());
        a.place(BodyId::new("pin").index(2), translator(-1.0, 0.0), &Circle::new(0.5).generate());
        let svg = a.to_svg(0.01);
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("pin[2]"));
        assert!(svg.contains("viewBox"));
    }
}
