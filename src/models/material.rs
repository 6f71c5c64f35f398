use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Catalog entry served by `crud/Materiales/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub sku: String,
    pub descripcion: String,
    pub categoria: String,
    pub unidad: String,
    pub costo_ref: f64,
    pub stock_actual: u32,
    pub stock_minimo: u32,
    pub proveedor_principal: String,
    pub activo: bool,
    pub fecha_creacion: String,
    pub fecha_actualizacion: String,
}

pub const MATERIALS_TABLE: &str = "Materiales";

struct Sample {
    sku: &'static str,
    descripcion: &'static str,
    categoria: &'static str,
    unidad: &'static str,
    costo_ref: f64,
    stock_actual: u32,
    stock_minimo: u32,
    proveedor_principal: &'static str,
}

const SAMPLES: [Sample; 5] = [
    Sample {
        sku: "MAT001",
        descripcion: "Cemento Portland Tipo I",
        categoria: "Construcción",
        unidad: "Bolsa",
        costo_ref: 25.50,
        stock_actual: 100,
        stock_minimo: 20,
        proveedor_principal: "Cementos Lima",
    },
    Sample {
        sku: "MAT002",
        descripcion: "Fierro de Construcción 1/2\"",
        categoria: "Construcción",
        unidad: "Varilla",
        costo_ref: 35.00,
        stock_actual: 50,
        stock_minimo: 10,
        proveedor_principal: "Aceros Arequipa",
    },
    Sample {
        sku: "MAT003",
        descripcion: "Ladrillo King Kong 18 huecos",
        categoria: "Construcción",
        unidad: "Unidad",
        costo_ref: 0.85,
        stock_actual: 5,
        stock_minimo: 100,
        proveedor_principal: "Ladrillera Norte",
    },
    Sample {
        sku: "MAT004",
        descripcion: "Arena Gruesa",
        categoria: "Agregados",
        unidad: "m³",
        costo_ref: 45.00,
        stock_actual: 0,
        stock_minimo: 5,
        proveedor_principal: "Agregados del Sur",
    },
    Sample {
        sku: "MAT005",
        descripcion: "Pintura Látex Blanco",
        categoria: "Acabados",
        unidad: "Galón",
        costo_ref: 85.00,
        stock_actual: 15,
        stock_minimo: 5,
        proveedor_principal: "Pinturas Tekno",
    },
];

/// The fixed sample catalog, stamped with `now` for both creation and update dates
pub fn sample_materials(now: DateTime<Utc>) -> Vec<Material> {
    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    SAMPLES
        .iter()
        .enumerate()
        .map(|(i, s)| Material {
            id: (i + 1).to_string(),
            sku: s.sku.to_string(),
            descripcion: s.descripcion.to_string(),
            categoria: s.categoria.to_string(),
            unidad: s.unidad.to_string(),
            costo_ref: s.costo_ref,
            stock_actual: s.stock_actual,
            stock_minimo: s.stock_minimo,
            proveedor_principal: s.proveedor_principal.to_string(),
            activo: true,
            fecha_creacion: stamp.clone(),
            fecha_actualizacion: stamp.clone(),
        })
        .collect()
}
