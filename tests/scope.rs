use std::error::Error;

use test_utils::{run_and_check, Expected};

const SOURCE: &str = r#"
val x = 1
{
    val x = 2
    print(x)
}
print(x)

def outer() {
    def isEven(n) { if n == 0 then true else isOdd(n - 1) }
    def isOdd(n)  { if n == 0 then false else isEven(n - 1) }
    isEven(6)
}
print(outer())
"#;

#[test]
fn nested_block_shadows_and_nested_mutual_recursion() -> Result<(), Box<dyn Error>> {
    run_and_check(
        SOURCE,
        Expected {
            stdout: "2\n1\ntrue\n",
        },
    )
}
