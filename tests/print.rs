use std::error::Error;

use test_utils::{run_and_check, Expected};

const SOURCE: &str = r#"
print(1)
print("a string")
print(true)
print(1, "two", false)
"#;

#[test]
fn print_stringifies_every_value_kind() -> Result<(), Box<dyn Error>> {
    run_and_check(
        SOURCE,
        Expected {
            stdout: "1\na string\ntrue\n1 two false\n",
        },
    )
}
