use std::error::Error;

use test_utils::{run_and_check, Expected};

const SOURCE: &str = r#"
print(true && false)
print(true || false)
print(!true)
print(1 < 2 && 2 < 3)
print(1 == 1 || 2 == 3)
"#;

#[test]
fn boolean_operators_and_comparisons() -> Result<(), Box<dyn Error>> {
    run_and_check(
        SOURCE,
        Expected {
            stdout: "false\ntrue\nfalse\ntrue\ntrue\n",
        },
    )
}
