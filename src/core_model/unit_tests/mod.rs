#[cfg(test)]
mod iocoom_tests;
