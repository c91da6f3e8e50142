use std::error::Error;

use test_utils::{run_and_check, Expected};

const SOURCE: &str = r#"print("Hello, World!")"#;

#[test]
fn runs_hello_world() -> Result<(), Box<dyn Error>> {
    run_and_check(
        SOURCE,
        Expected {
            stdout: "Hello, World!\n",
        },
    )
}
