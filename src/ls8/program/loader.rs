use std::fs;
use std::path::Path;

use crate::ls8::errors::LoadError;

/// Parses a `.ls8` image: one byte per line, written as a binary numeral.
///
/// Leading whitespace is ignored and anything after the run of binary digits
/// (typically a `#` comment) is dropped. Lines that do not start with a binary
/// digit produce no byte. Numerals wider than eight bits keep their low byte.
pub fn parse_image(text: &str) -> Vec<u8> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<u8> {
    let (count, value) = line
        .trim_start()
        .bytes()
        .take_while(|b| matches!(b, b'0' | b'1'))
        .fold((0usize, 0u8), |(n, acc), d| (n + 1, (acc << 1) | (d - b'0')));
    (count > 0).then_some(value)
}

/// Reads and parses the image at `path`.
pub fn read_image(path: impl AsRef<Path>) -> Result<Vec<u8>, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bytes = parse_image(&text);
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "image parsed");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bytes_and_skips_comments() {
        let text = "# print8.ls8\n\
                    10000010 # LDI R0,8\n\
                    00000000\n\
                    00001000\n\
                    \n\
                    01000111 # PRN R0\n\
                    00000000\n\
                    00000001 # HLT\n";
        assert_eq!(
            parse_image(text),
            vec![0b1000_0010, 0, 8, 0b0100_0111, 0, 1]
        );
    }

    #[test]
    fn leading_whitespace_and_trailing_text() {
        assert_eq!(parse_image("   101xyz\n\t11\r\n"), vec![5, 3]);
    }

    #[test]
    fn non_binary_lines_are_skipped() {
        assert_eq!(parse_image("LDI\n2\n-1\n; note\n1"), vec![1]);
    }

    #[test]
    fn zero_lines_still_yield_a_byte() {
        assert_eq!(parse_image("0\n00000000 # pad\n 0x\n"), vec![0, 0, 0]);
    }

    #[test]
    fn wide_numerals_keep_low_byte() {
        assert_eq!(parse_image("100000001\n"), vec![1]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_image("/nonexistent/dir/prog.ls8").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/dir/prog.ls8"));
    }
}
