use std::io::{self, BufRead, Write};

/// Reads one line with the trailing newline removed. `None` means end of input.
pub fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed_len);
    Ok(Some(line))
}

pub fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(output, "{prompt}")?;
    output.flush()?;
    read_line(input)
}

/// Re-prompts until the answer parses as an integer.
pub fn ask_number<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    error_message: &str,
) -> io::Result<Option<i64>> {
    loop {
        let Some(answer) = ask(input, output, prompt)? else {
            return Ok(None);
        };
        match answer.trim().parse::<i64>() {
            Ok(number) => return Ok(Some(number)),
            Err(_) => writeln!(output, "{error_message}")?,
        }
    }
}

/// Re-prompts until the answer is `y` or `n` (any case).
pub fn ask_yes_no<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<bool>> {
    loop {
        let Some(answer) = ask(input, output, prompt)? else {
            return Ok(None);
        };
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" => return Ok(Some(true)),
            "n" => return Ok(Some(false)),
            _ => writeln!(output, "Invalid response. Please enter 'y' or 'n'.")?,
        }
    }
}
