use std::error::Error;

use test_utils::{run_and_check, Expected};

const SOURCE: &str = r#"
var x = 1
{
    x = x + 1
}
print(x)
"#;

#[test]
fn mutation_inside_a_nested_block_is_visible_outside() -> Result<(), Box<dyn Error>> {
    run_and_check(SOURCE, Expected { stdout: "2\n" })
}
