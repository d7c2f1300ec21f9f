use ratatui::style::Color;

/// `m:ss`, as shown on the timer
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Red below 80%, yellow below 95%, green otherwise
pub fn accuracy_color(accuracy: u32) -> Color {
    if accuracy < 80 {
        Color::Red
    } else if accuracy < 95 {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// Rows a prompt of `text_width` columns needs at `line_width`
pub fn text_lines(text_width: usize, line_width: u16) -> u16 {
    let line_width = line_width.max(1) as usize;
    if text_width <= line_width {
        1
    } else {
        // one spare row for wrapping at word boundaries
        (text_width.div_ceil(line_width) + 1) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(9), "0:09");
        assert_eq!(format_clock(60), "1:00");
        assert_eq!(format_clock(125), "2:05");
    }

    #[test]
    fn test_accuracy_color_bands() {
        assert_eq!(accuracy_color(0), Color::Red);
        assert_eq!(accuracy_color(79), Color::Red);
        assert_eq!(accuracy_color(80), Color::Yellow);
        assert_eq!(accuracy_color(94), Color::Yellow);
        assert_eq!(accuracy_color(95), Color::Green);
        assert_eq!(accuracy_color(100), Color::Green);
    }

    #[test]
    fn test_text_lines() {
        assert_eq!(text_lines(10, 40), 1);
        assert_eq!(text_lines(40, 40), 1);
        assert_eq!(text_lines(41, 40), 3);
        assert_eq!(text_lines(5, 0), 6);
    }
}
