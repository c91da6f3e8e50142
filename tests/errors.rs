use std::error::Error;

use test_utils::expect_failure;

#[test]
fn division_by_zero_is_a_runtime_error() -> Result<(), Box<dyn Error>> {
    let message = expect_failure("1 / 0")?;
    assert!(message.contains("RuntimeError"), "{message}");
    assert!(message.contains("division by zero"), "{message}");
    Ok(())
}

#[test]
fn min_requires_at_least_two_arguments() -> Result<(), Box<dyn Error>> {
    let message = expect_failure("min(3)")?;
    assert!(message.contains("TypeError"), "{message}");

    let message = expect_failure("min()")?;
    assert!(message.contains("TypeError"), "{message}");
    Ok(())
}

#[test]
fn reassigning_a_val_is_a_type_error() -> Result<(), Box<dyn Error>> {
    let message = expect_failure("val x = 1\nx = 2")?;
    assert!(message.contains("TypeError"), "{message}");
    assert!(message.contains("immutable"), "{message}");
    Ok(())
}

#[test]
fn break_outside_a_while_loop_is_a_type_error() -> Result<(), Box<dyn Error>> {
    let message = expect_failure("break")?;
    assert!(message.contains("TypeError"), "{message}");
    Ok(())
}

#[test]
fn continue_outside_a_while_loop_is_a_type_error() -> Result<(), Box<dyn Error>> {
    let message = expect_failure("continue")?;
    assert!(message.contains("TypeError"), "{message}");
    Ok(())
}

#[test]
fn unterminated_string_is_a_lex_error_at_the_opening_quote() -> Result<(), Box<dyn Error>> {
    let message = expect_failure("val x = \"abc")?;
    assert!(message.contains("LexError"), "{message}");
    assert!(message.contains("1:9"), "{message}");
    Ok(())
}
