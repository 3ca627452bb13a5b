pub mod attachment_service;
pub mod patient_service;
pub mod storage;
