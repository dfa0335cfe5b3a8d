//! Arabic presentation helpers for renderers without script shaping.
//!
//! [`reshape`] replaces Arabic letters with their contextual presentation
//! forms (Unicode Arabic Presentation Forms-B) and [`process_arabic_text`]
//! additionally wraps the shaped runs in right-to-left marks, keeping `<i>`
//! emphasis tags intact. Both are purely presentational: [`strip_rtl_marks`]
//! followed by [`unshape`] gives back the logical text.

/// RIGHT-TO-LEFT MARK.
pub const RLM: char = '\u{200F}';

const TAG_OPEN: &str = "<i>";
const TAG_CLOSE: &str = "</i>";

/// `(letter, first presentation form, number of forms)`.
/// Forms are laid out as isolated, final, initial, medial.
const LETTERS: &[(char, u32, u8)] = &[
    ('\u{0621}', 0xFE80, 1),
    ('\u{0622}', 0xFE81, 2),
    ('\u{0623}', 0xFE83, 2),
    ('\u{0624}', 0xFE85, 2),
    ('\u{0625}', 0xFE87, 2),
    ('\u{0626}', 0xFE89, 4),
    ('\u{0627}', 0xFE8D, 2),
    ('\u{0628}', 0xFE8F, 4),
    ('\u{0629}', 0xFE93, 2),
    ('\u{062A}', 0xFE95, 4),
    ('\u{062B}', 0xFE99, 4),
    ('\u{062C}', 0xFE9D, 4),
    ('\u{062D}', 0xFEA1, 4),
    ('\u{062E}', 0xFEA5, 4),
    ('\u{062F}', 0xFEA9, 2),
    ('\u{0630}', 0xFEAB, 2),
    ('\u{0631}', 0xFEAD, 2),
    ('\u{0632}', 0xFEAF, 2),
    ('\u{0633}', 0xFEB1, 4),
    ('\u{0634}', 0xFEB5, 4),
    ('\u{0635}', 0xFEB9, 4),
    ('\u{0636}', 0xFEBD, 4),
    ('\u{0637}', 0xFEC1, 4),
    ('\u{0638}', 0xFEC5, 4),
    ('\u{0639}', 0xFEC9, 4),
    ('\u{063A}', 0xFECD, 4),
    ('\u{0641}', 0xFED1, 4),
    ('\u{0642}', 0xFED5, 4),
    ('\u{0643}', 0xFED9, 4),
    ('\u{0644}', 0xFEDD, 4),
    ('\u{0645}', 0xFEE1, 4),
    ('\u{0646}', 0xFEE5, 4),
    ('\u{0647}', 0xFEE9, 4),
    ('\u{0648}', 0xFEED, 2),
    ('\u{0649}', 0xFEEF, 2),
    ('\u{064A}', 0xFEF1, 4),
];

const LAM: char = '\u{0644}';
const TATWEEL: char = '\u{0640}';

/// Alef variants that fuse with a preceding lam, with the isolated form of
/// the ligature (the final form follows it).
const LAM_ALEF: &[(char, u32)] = &[
    ('\u{0622}', 0xFEF5),
    ('\u{0623}', 0xFEF7),
    ('\u{0625}', 0xFEF9),
    ('\u{0627}', 0xFEFB),
];

#[derive(Clone, Copy)]
enum Form {
    Isolated = 0,
    Final = 1,
    Initial = 2,
    Medial = 3,
}

fn letter(c: char) -> Option<(u32, u8)> {
    LETTERS
        .iter()
        .find(|(l, _, _)| *l == c)
        .map(|&(_, first, forms)| (first, forms))
}

/// Harakat and other combining marks do not break joining.
fn is_transparent(c: char) -> bool {
    matches!(c, '\u{0610}'..='\u{061A}' | '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{06D6}'..='\u{06ED}')
}

/// Whether `c` connects to the letter that follows it.
fn joins_next(c: char) -> bool {
    c == TATWEEL || matches!(letter(c), Some((_, 4)))
}

/// Whether `c` connects to the letter that precedes it.
fn joins_prev(c: char) -> bool {
    c == TATWEEL || matches!(letter(c), Some((_, forms)) if forms >= 2)
}

fn shaped(c: char, form: Form) -> char {
    match letter(c) {
        Some((first, forms)) => {
            let offset = (form as u32).min(forms as u32 - 1);
            char::from_u32(first + offset).unwrap_or(c)
        }
        None => c,
    }
}

/// Replace Arabic letters with their contextual presentation forms.
/// Lam followed by an alef becomes the corresponding ligature. Characters
/// outside the Arabic block are left untouched.
pub fn reshape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    // Last non-transparent character emitted, used for joining decisions.
    let mut prev: Option<char> = None;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if is_transparent(c) {
            out.push(c);
            i += 1;
            continue;
        }
        let after_prev = prev.is_some_and(joins_next);
        let next = chars[i + 1..].iter().copied().find(|&n| !is_transparent(n));

        // Only an alef directly after the lam fuses; a vowelled lam keeps
        // its own glyph so marks stay in logical order.
        if c == LAM {
            let alef = chars
                .get(i + 1)
                .and_then(|n| LAM_ALEF.iter().find(|(a, _)| a == n));
            if let Some(&(alef, iso)) = alef {
                let form = if after_prev { iso + 1 } else { iso };
                out.push(char::from_u32(form).unwrap_or(c));
                // The ligature ends in an alef, which never joins forward.
                prev = Some(alef);
                i += 2;
                continue;
            }
        }

        if letter(c).is_none() {
            out.push(c);
            prev = Some(c);
            i += 1;
            continue;
        }
        let before_next = joins_next(c) && next.is_some_and(joins_prev);
        let form = match (after_prev, before_next) {
            (false, false) => Form::Isolated,
            (true, false) => Form::Final,
            (false, true) => Form::Initial,
            (true, true) => Form::Medial,
        };
        out.push(shaped(c, form));
        prev = Some(c);
        i += 1;
    }
    out
}

/// Map presentation forms back to their base letters.
pub fn unshape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let code = c as u32;
        if let Some(&(alef, _)) = LAM_ALEF
            .iter()
            .find(|(_, iso)| code == *iso || code == iso + 1)
        {
            out.push(LAM);
            out.push(alef);
            continue;
        }
        let base = LETTERS
            .iter()
            .find(|(_, first, forms)| code >= *first && code < first + *forms as u32)
            .map(|&(l, _, _)| l);
        out.push(base.unwrap_or(c));
    }
    out
}

/// Remove every right-to-left mark.
pub fn strip_rtl_marks(text: &str) -> String {
    text.chars().filter(|&c| c != RLM).collect()
}

fn wrap_rtl(out: &mut String, segment: &str) {
    out.push(RLM);
    out.push_str(&reshape(segment));
    out.push(RLM);
}

/// Prepare translated Arabic text for display.
///
/// Every segment outside `<i>` tags is reshaped and wrapped in RTL marks,
/// even when empty. The text inside a tag pair is kept verbatim so the
/// markup stays intact.
pub fn process_arabic_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    if !text.contains(TAG_OPEN) {
        wrap_rtl(&mut out, text);
        return out;
    }
    for part in text.split(TAG_OPEN) {
        match part.split_once(TAG_CLOSE) {
            Some((inside, after)) => {
                out.push_str(TAG_OPEN);
                out.push_str(inside);
                out.push_str(TAG_CLOSE);
                wrap_rtl(&mut out, after);
            }
            None => wrap_rtl(&mut out, part),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_joining_positions() {
        // بيت: initial beh, medial yeh, final teh.
        assert_eq!(reshape("بيت"), "\u{FE91}\u{FEF4}\u{FE96}");
        // A lone letter keeps its isolated form.
        assert_eq!(reshape("ب"), "\u{FE8F}");
    }

    #[test]
    fn right_joining_letters_break_the_run() {
        // دب: dal never joins forward, so beh is isolated.
        assert_eq!(reshape("دب"), "\u{FEA9}\u{FE8F}");
        // بد: beh initial, dal final.
        assert_eq!(reshape("بد"), "\u{FE91}\u{FEAA}");
    }

    #[test]
    fn builds_lam_alef_ligatures() {
        assert_eq!(reshape("لا"), "\u{FEFB}");
        // سلام: seen initial, lam-alef final, meem isolated.
        assert_eq!(reshape("سلام"), "\u{FEB3}\u{FEFC}\u{FEE1}");
    }

    #[test]
    fn harakat_do_not_break_joining() {
        let shaped = reshape("بَت");
        assert_eq!(shaped, "\u{FE91}\u{064E}\u{FE96}");
    }

    #[test]
    fn leaves_latin_and_spaces() {
        assert_eq!(reshape("Hi 2"), "Hi 2");
        assert_eq!(reshape("ب ب"), "\u{FE8F} \u{FE8F}");
    }

    #[test]
    fn vowelled_lam_does_not_fuse() {
        // Lam initial, fatha, alef final.
        assert_eq!(reshape("لَا"), "\u{FEDF}\u{064E}\u{FE8E}");
    }

    #[test]
    fn empty_text_still_gets_marks() {
        assert_eq!(process_arabic_text(""), format!("{RLM}{RLM}"));
    }

    #[test]
    fn wraps_plain_text_in_marks() {
        let out = process_arabic_text("مرحبا");
        assert!(out.starts_with(RLM) && out.ends_with(RLM));
        assert_eq!(unshape(&strip_rtl_marks(&out)), "مرحبا");
    }

    #[test]
    fn keeps_emphasis_tags_around_verbatim_segment() {
        let out = process_arabic_text("<i>مرحبا</i> عالم");
        let expected = format!("{RLM}{RLM}<i>مرحبا</i>{RLM}{}{RLM}", reshape(" عالم"));
        assert_eq!(out, expected);
    }

    #[test]
    fn shapes_text_before_emphasis() {
        let out = process_arabic_text("قال <i>لا</i>");
        let expected = format!("{RLM}{}{RLM}<i>لا</i>{RLM}{RLM}", reshape("قال "));
        assert_eq!(out, expected);
    }

    #[test]
    fn round_trip_recovers_logical_text() {
        for text in ["السلام عليكم", "<i>نعم</i> لا أعرف", "مرحبا بك في <i>البيت</i>!", "لَا أَعْلَم", ""] {
            let out = process_arabic_text(text);
            assert_eq!(unshape(&strip_rtl_marks(&out)), text);
        }
    }
}
