use std::error::Error;

use test_utils::{run_and_check, Expected};

const SOURCE: &str = r#"
var a = 10
a += 3
var b = 17
val c = 42
var d = 1000
d += 337
print(a, b, c, d)
"#;

#[test]
fn compound_assignment_and_mixed_bindings() -> Result<(), Box<dyn Error>> {
    run_and_check(SOURCE, Expected { stdout: "13 17 42 1337\n" })
}

const CHAINED_SOURCE: &str = r#"
var a = 0
var b = 0
var c = 0
a = b = c = 7
print(a, b, c)
"#;

#[test]
fn assignment_is_right_associative_and_chains() -> Result<(), Box<dyn Error>> {
    run_and_check(CHAINED_SOURCE, Expected { stdout: "7 7 7\n" })
}

const NESTED_IN_CALL_SOURCE: &str = r#"
var x = 0
print(x = 5)
print(x)
"#;

#[test]
fn assignment_can_appear_as_a_call_argument() -> Result<(), Box<dyn Error>> {
    run_and_check(NESTED_IN_CALL_SOURCE, Expected { stdout: "\n5\n" })
}
