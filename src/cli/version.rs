/// Display version information
pub fn execute() {
    println!("plenary {}", env!("CARGO_PKG_VERSION"));
    println!("Motion voting sessions and tally engine");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_execute() {
        execute();
    }
}
