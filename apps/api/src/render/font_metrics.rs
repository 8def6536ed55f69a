//! Static font-metric tables for the two base-14 fonts used in decks.
//!
//! Character widths are in em units (relative to font size), taken from the Helvetica and
//! Helvetica-Bold AFM files. Tables cover ASCII 0x20..=0x7E (95 printable characters);
//! index = (char as usize) - 32.

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one font.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for characters outside the table.
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Width of `s` in points at `font_size`.
    pub fn width_pt(&self, s: &str, font_size: f32) -> f32 {
        self.measure_str(s) * font_size
    }

    /// Greedy word-wrap of `s` into lines no wider than `max_width_pt`.
    ///
    /// Words wider than a whole line are split between characters. Empty input yields no lines.
    pub fn wrap(&self, s: &str, font_size: f32, max_width_pt: f32) -> Vec<String> {
        let max_width = (max_width_pt / font_size).max(self.average_char_width);
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in s.split_whitespace() {
            let word_w = self.measure_str(word);

            if word_w > max_width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                for c in word.chars() {
                    let c_w = self.measure_str(c.encode_utf8(&mut [0; 4]));
                    if !current.is_empty() && current_width + c_w > max_width {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0.0;
                    }
                    current.push(c);
                    current_width += c_w;
                }
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
                current_width = word_w;
            } else if current_width + self.space_width + word_w > max_width {
                lines.push(std::mem::replace(&mut current, word.to_string()));
                current_width = word_w;
            } else {
                current.push(' ');
                current.push_str(word);
                current_width += self.space_width + word_w;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

/// Returns the metric table for the regular or bold face.
pub fn get_metrics(bold: bool) -> &'static FontMetricTable {
    if bold {
        &HELVETICA_BOLD_TABLE
    } else {
        &HELVETICA_TABLE
    }
}

/// Maps text onto what the base-14 fonts can show: printable ASCII plus Latin-1.
///
/// Common typographic characters are transliterated and anything else becomes `?`.
/// Latin-1 characters are measured with the average width.
pub fn pdf_safe_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            ' '..='~' => out.push(c),
            '\t' | '\n' | '\r' | '\u{a0}' => out.push(' '),
            '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{2032}' => out.push('\''),
            '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{2033}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2022}' => out.push('*'),
            '\u{2026}' => out.push_str("..."),
            '\u{2191}' => out.push_str("up"),
            '\u{2193}' => out.push_str("down"),
            '\u{2192}' => out.push_str("->"),
            '\u{20ac}' => out.push_str("EUR"),
            // WinAnsi covers Latin-1
            '\u{a1}'..='\u{ff}' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.55,
    space_width: 0.278,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.6,
    space_width: 0.278,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        let regular = get_metrics(false);
        assert!((regular.measure_str("A") - 0.667).abs() < 1e-6);
        assert!((regular.measure_str("i") - 0.222).abs() < 1e-6);
        assert!((regular.width_pt("0000", 10.0) - 22.24).abs() < 1e-3);
    }

    #[test]
    fn test_bold_is_wider_than_regular() {
        let text = "Campaign Performance Review";
        assert!(get_metrics(true).measure_str(text) > get_metrics(false).measure_str(text));
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        let lines = get_metrics(false).wrap("Revenue grew 24%", 12.0, 400.0);
        assert_eq!(lines, vec!["Revenue grew 24%"]);
    }

    #[test]
    fn test_wrap_respects_width() {
        let metrics = get_metrics(false);
        let text = "Outstanding Q2 performance with record-breaking growth across all key \
                    metrics and a customer base that expanded by 28% while retention held";
        let lines = metrics.wrap(text, 12.0, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(metrics.width_pt(line, 12.0) <= 200.0 + 1e-3, "{line}");
        }
        assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_wrap_splits_overlong_word() {
        let metrics = get_metrics(false);
        let lines = metrics.wrap("https://example.com/a/very/long/path/without/spaces", 10.0, 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(metrics.width_pt(line, 10.0) <= 60.0 + 1e-3);
        }
    }

    #[test]
    fn test_wrap_empty_text_has_no_lines() {
        assert!(get_metrics(true).wrap("   ", 10.0, 100.0).is_empty());
    }

    #[test]
    fn test_pdf_safe_text_transliterates() {
        assert_eq!(pdf_safe_text("“Q2” – 45% ↑ …"), "\"Q2\" - 45% up ...");
        assert_eq!(pdf_safe_text("Café naïve £5 × 2"), "Café naïve £5 × 2");
        assert_eq!(pdf_safe_text("日本"), "??");
        assert_eq!(pdf_safe_text("plain ascii"), "plain ascii");
    }
}
