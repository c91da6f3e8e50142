use std::error::Error;

use test_utils::{run_and_check, Expected};

const SOURCE: &str = r#"
def ackermann(m, n) {
    if m == 0 then n + 1
    else if n == 0 then ackermann(m - 1, 1)
    else ackermann(m - 1, ackermann(m, n - 1))
}
print(ackermann(2, 3))
"#;

#[test]
fn deeply_recursive_ackermann() -> Result<(), Box<dyn Error>> {
    run_and_check(SOURCE, Expected { stdout: "9\n" })
}
