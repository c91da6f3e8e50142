use std::error::Error;

use test_utils::{run_and_check, Expected};

const SOURCE: &str = r#"
def fib(n) { if n < 2 then n else fib(n - 1) + fib(n - 2) }
print(fib(10))
"#;

#[test]
fn recursive_fibonacci() -> Result<(), Box<dyn Error>> {
    run_and_check(SOURCE, Expected { stdout: "55\n" })
}
