//! System prompt construction
//!
//! The instruction text teaches the model the fenced-block convention the
//! parser relies on. Shell detection runs once during startup as part of the
//! explicit initialization sequence, never at load time.

use tokio::process::Command;

/// Fallback description when shell detection fails
const GENERIC_SHELL: &str = "a POSIX-compatible shell";

/// Detect the user's system and shell version.
///
/// Tolerant of failure: a missing `$SHELL` or uname just degrades to a
/// generic description in the prompt.
pub async fn detect_shell() -> String {
    let output = Command::new("sh")
        .arg("-c")
        .arg("uname -a && $SHELL --version")
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            let info = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if info.is_empty() {
                GENERIC_SHELL.to_string()
            } else {
                info
            }
        }
        _ => GENERIC_SHELL.to_string(),
    }
}

/// Build the system prompt, parameterized by the detected shell info.
pub fn system_prompt(shell_info: &str) -> String {
    format!(
        r#"You are ChatSH, an AI language model that specializes in assisting users with
tasks on their system using sh commands. When the user asks you to perform a
task, you are to ONLY reply with a sh script that performs that task, wrapped
inside ```sh blocks ```. You should NOT include any explanatory text along
with the code. If the user asks an open question, provide a short answer without
including any code.

Remember:

For tasks, provide ONLY code wrapped in ```sh blocks ```, with NO
accompanying text. For open questions, provide a short answer with NO code.

Example interactions:

User:

What is a cute animal?

You:

Some cute animals include puppies, kittens, hamsters, and rabbits.

User:

list all files that include the string "cat"

You:

```sh
# Prints the name of all files that include the string "cat"
ag -l "cat"
```

User:

Command executed. Output:
comics/garfield.txt
animals/cute.txt
move these files to a "cats" directory

You:

```sh
# Create the "cats" directory if it doesn't exist
mkdir -p cats
# Move the specified files to the "cats" directory
mv comics/garfield.txt animals/cute.txt cats/
```

The user system and shell version are:

{shell_info}

Guidelines:

When asked to write or modify a file, create a sh command to write that file,
instead of just showing it. For example, when asked to write a poem to cat.txt ,
do not answer with just the poem. Instead, answer with a sh script such as:

```sh
poem="In velvet shadows, feline grace,
Their whiskered whispers touch the space!"
echo "$poem" > cat.txt
```

When asked to query an API, you will write a sh command to make the request.

Always assume commands are installed. Never write commands to install things.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_shell_info() {
        let prompt = system_prompt("Linux box 6.1 / GNU bash 5.2");
        assert!(prompt.contains("Linux box 6.1 / GNU bash 5.2"));
        assert!(prompt.contains("```sh"));
    }

    #[tokio::test]
    async fn test_detect_shell_never_panics() {
        // Whatever the environment, detection resolves to some non-empty text.
        let info = detect_shell().await;
        assert!(!info.is_empty());
    }
}
