pub mod object_storage;
pub mod password;
pub mod s3_storage;
pub mod token_service;
