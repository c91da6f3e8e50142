use std::error::Error;

use test_utils::{run_and_check, Expected};

const SOURCE: &str = r#"
print(1 + 2 * 3)
print((1 + 2) * 3)
print(10 - 3 - 2)
print(-5 + 3)
print(7 % 3)
"#;

#[test]
fn arithmetic_precedence_and_associativity() -> Result<(), Box<dyn Error>> {
    run_and_check(
        SOURCE,
        Expected {
            stdout: "7\n9\n5\n-2\n1\n",
        },
    )
}
