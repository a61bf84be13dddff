pub mod image_upload;
