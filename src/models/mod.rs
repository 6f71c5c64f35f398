pub mod material;
pub mod user;

pub use material::{sample_materials, Material, MATERIALS_TABLE};
pub use user::{LoginResponse, User};
