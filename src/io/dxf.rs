//! DXF export of an arrangement as closed lightweight polylines.

use super::ExportError;
use crate::trains::Arrangement;
use dxf::entities::{Entity, EntityType, LwPolyline};
use dxf::LwPolylineVertex;
use dxf::enums::AcadVersion;
use dxf::tables::Layer;
use dxf::Drawing;
use std::collections::BTreeSet;

impl Arrangement {
    /// One closed `LWPOLYLINE` per loop, on a layer named after its body.
    pub fn to_dxf(&self) -> Result<Vec<u8>, ExportError> {
        let mut drawing = Drawing::new();
        // LWPOLYLINE needs R14 or later
        drawing.header.version = AcadVersion::R2000;

        let layers: BTreeSet<&str> = self.bodies().iter().map(|b| b.body.name).collect();
        for name in layers {
            drawing.add_layer(Layer {
                name: name.to_string(),
                ..Default::default()
            });
        }

        for body in self.bodies() {
            for line in body.profile.loops() {
                if line.0.len() < 2 {
                    continue;
                }
                let mut polyline = LwPolyline::default();
                polyline.set_is_closed(true);
                #[allow(clippy::unnecessary_cast)]
                let vertices = line.0.iter().map(|c| LwPolylineVertex {
                    x: c.x as f64,
                    y: c.y as f64,
                    ..Default::default()
                });
                polyline.vertices.extend(vertices);
                let mut entity = Entity::new(EntityType::LwPolyline(polyline));
                entity.common.layer = body.body.name.to_string();
                drawing.add_entity(entity);
            }
        }

        let mut buffer = Vec::new();
        drawing.save(&mut buffer)?;
        Ok(buffer)
    }
}
