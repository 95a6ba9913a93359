pub mod item;
pub mod openapi;

#[cfg(test)]
pub mod test_util;
