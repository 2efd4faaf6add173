// ABOUTME: Discovers the executable a build command produces.
// ABOUTME: Looks for an `-o <name>` flag, falling back to a default name.

/// Name of the binary `build_command` writes, from its `-o` flag.
///
/// Falls back to `default` when there is no command, no `-o`, or `-o` is
/// the last token.
pub fn extract_executable_name(build_command: Option<&str>, default: &str) -> String {
    build_command
        .and_then(|command| {
            let tokens: Vec<&str> = command.split_whitespace().collect();
            tokens
                .windows(2)
                .find(|pair| pair[0] == "-o")
                .map(|pair| pair[1].to_string())
        })
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_output_flag() {
        assert_eq!(
            extract_executable_name(Some("go build -o myService ."), "app"),
            "myService"
        );
    }

    #[test]
    fn finds_output_flag_among_other_flags() {
        let command = "go build -tags netgo -ldflags '-s -w' -o server ./cmd/server";
        assert_eq!(extract_executable_name(Some(command), "app"), "server");
    }

    #[test]
    fn first_output_flag_wins() {
        assert_eq!(
            extract_executable_name(Some("build -o first -o second"), "app"),
            "first"
        );
    }

    #[test]
    fn missing_flag_uses_default() {
        assert_eq!(extract_executable_name(Some("go build ."), "app"), "app");
    }

    #[test]
    fn trailing_flag_uses_default() {
        assert_eq!(extract_executable_name(Some("go build -o"), "app"), "app");
    }

    #[test]
    fn absent_command_uses_default() {
        assert_eq!(extract_executable_name(None, "app"), "app");
        assert_eq!(extract_executable_name(Some("   "), "app"), "app");
    }

    #[test]
    fn flag_must_be_its_own_token() {
        assert_eq!(extract_executable_name(Some("cc -oprog main.c"), "app"), "app");
    }
}
