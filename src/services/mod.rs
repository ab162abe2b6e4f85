#[cfg(test)]
pub mod fake_backend;
pub mod s3_backend;
pub mod storage_service;
