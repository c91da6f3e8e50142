use std::error::Error;

use test_utils::{run_and_check, Expected};

const SOURCE: &str = r#"
def add(a, b = 10) { a + b }
print(add(5))
print(add(5, 1))
val double = (x) => x * 2
print(double(21))
val triple = fn(x) { x * 3 }
print(triple(4))
"#;

#[test]
fn default_arguments_and_lambda_forms() -> Result<(), Box<dyn Error>> {
    run_and_check(
        SOURCE,
        Expected {
            stdout: "15\n6\n42\n12\n",
        },
    )
}
