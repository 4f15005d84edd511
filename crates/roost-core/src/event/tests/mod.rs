// Event system test module
#[cfg(test)]
mod dispatcher_tests;
#[cfg(test)]
mod types_tests;
