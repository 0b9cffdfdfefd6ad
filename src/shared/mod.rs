pub mod constants;
pub mod filename;
pub mod types;

#[cfg(test)]
pub mod test_helpers;
