use std::error::Error;

use test_utils::{run_and_check, Expected};

const SOURCE: &str = r#"
var i = 0
while i < 10 {
    print(i)
    i += 1
}
"#;

#[test]
fn while_loop_counts_to_ten() -> Result<(), Box<dyn Error>> {
    run_and_check(
        SOURCE,
        Expected {
            stdout: "0\n1\n2\n3\n4\n5\n6\n7\n8\n9\n",
        },
    )
}
