pub mod claims_validator;
