pub mod cloudinary;
pub mod project_service;
pub mod provider;
