//! Document compatibility mode decision for a parsed DOCTYPE.
//!
//! @see https://html.spec.whatwg.org/#the-initial-insertion-mode

use crate::compat_mode::CompatMode;

/// Applies the quirks-mode table to a tokenized DOCTYPE's name, public id,
/// and system id (already absent-vs-empty distinguished by `Option`).
///
/// The public/system id prefix lists below are the exact legacy-DTD table
/// from the standard; there is no shorter equivalent rule.
pub fn decide_compat_mode(
    name: Option<&str>,
    public_id: Option<&str>,
    system_id: Option<&str>,
    force_quirks: bool,
) -> CompatMode {
    if force_quirks || !matches!(name, Some("html")) {
        return CompatMode::Quirks;
    }

    let system_missing = system_id.is_none();
    let public = public_id.unwrap_or("").to_ascii_lowercase();
    let system = system_id.unwrap_or("").to_ascii_lowercase();

    if public_id.is_none() && system_id.is_none() {
        return CompatMode::NoQuirks;
    }

    if public == "-//w3o//dtd w3 html strict 3.0//en//"
        || public == "-/w3c/dtd html 4.0 transitional/en"
        || public == "html"
    {
        return CompatMode::Quirks;
    }

    if system == "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd" {
        return CompatMode::Quirks;
    }

    const QUIRKY_PREFIXES: &[&str] = &[
        "+//silmaril//dtd html pro v0r11 19970101//",
        "-//as//dtd html 3.0 aswedit + extensions//",
        "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
        "-//ietf//dtd html 2.0 level 1//",
        "-//ietf//dtd html 2.0 level 2//",
        "-//ietf//dtd html 2.0 strict level 1//",
        "-//ietf//dtd html 2.0 strict level 2//",
        "-//ietf//dtd html 2.0 strict//",
        "-//ietf//dtd html 2.0//",
        "-//ietf//dtd html 2.1e//",
        "-//ietf//dtd html 3.0//",
        "-//ietf//dtd html 3.2 final//",
        "-//ietf//dtd html 3.2//",
        "-//ietf//dtd html 3//",
        "-//ietf//dtd html level 0//",
        "-//ietf//dtd html level 1//",
        "-//ietf//dtd html level 2//",
        "-//ietf//dtd html level 3//",
        "-//ietf//dtd html strict level 0//",
        "-//ietf//dtd html strict level 1//",
        "-//ietf//dtd html strict level 2//",
        "-//ietf//dtd html strict level 3//",
        "-//ietf//dtd html strict//",
        "-//ietf//dtd html//",
        "-//metrius//dtd metrius presentational//",
        "-//microsoft//dtd internet explorer 2.0 html strict//",
        "-//microsoft//dtd internet explorer 2.0 html//",
        "-//microsoft//dtd internet explorer 2.0 tables//",
        "-//microsoft//dtd internet explorer 3.0 html strict//",
        "-//microsoft//dtd internet explorer 3.0 html//",
        "-//microsoft//dtd internet explorer 3.0 tables//",
        "-//netscape comm. corp.//dtd html//",
        "-//netscape comm. corp.//dtd strict html//",
        "-//o'reilly and associates//dtd html 2.0//",
        "-//o'reilly and associates//dtd html extended 1.0//",
        "-//o'reilly and associates//dtd html extended relaxed 1.0//",
        "-//sq//dtd html 2.0 hotmetal + extensions//",
        "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
        "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
        "-//spyglass//dtd html 2.0 extended//",
        "-//sun microsystems corp.//dtd hotjava html//",
        "-//sun microsystems corp.//dtd hotjava strict html//",
        "-//w3c//dtd html 3 1995-03-24//",
        "-//w3c//dtd html 3.2 draft//",
        "-//w3c//dtd html 3.2 final//",
        "-//w3c//dtd html 3.2//",
        "-//w3c//dtd html 3.2s draft//",
        "-//w3c//dtd html 4.0 frameset//",
        "-//w3c//dtd html 4.0 transitional//",
        "-//w3c//dtd html experimental 19960712//",
        "-//w3c//dtd html experimental 970421//",
        "-//w3c//dtd w3 html//",
        "-//w3o//dtd w3 html 3.0//",
        "-//webtechs//dtd mozilla html 2.0//",
        "-//webtechs//dtd mozilla html//",
    ];

    if QUIRKY_PREFIXES.iter().any(|p| public.starts_with(p)) {
        return CompatMode::Quirks;
    }

    if system_missing
        && (public.starts_with("-//w3c//dtd html 4.01 frameset//")
            || public.starts_with("-//w3c//dtd html 4.01 transitional//"))
    {
        return CompatMode::Quirks;
    }

    if public.starts_with("-//w3c//dtd xhtml 1.0 frameset//")
        || public.starts_with("-//w3c//dtd xhtml 1.0 transitional//")
    {
        return CompatMode::LimitedQuirks;
    }

    if !system_missing
        && (public.starts_with("-//w3c//dtd html 4.01 frameset//")
            || public.starts_with("-//w3c//dtd html 4.01 transitional//"))
    {
        return CompatMode::LimitedQuirks;
    }

    CompatMode::NoQuirks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_html_doctype_is_no_quirks() {
        assert_eq!(
            decide_compat_mode(Some("html"), None, None, false),
            CompatMode::NoQuirks
        );
    }

    #[test]
    fn legacy_strict_3_0_is_quirks() {
        assert_eq!(
            decide_compat_mode(
                Some("html"),
                Some("-//W3O//DTD W3 HTML Strict 3.0//EN//"),
                None,
                false
            ),
            CompatMode::Quirks
        );
    }

    #[test]
    fn xhtml_transitional_is_limited_quirks() {
        assert_eq!(
            decide_compat_mode(
                Some("html"),
                Some("-//W3C//DTD XHTML 1.0 Transitional//EN"),
                Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd"),
                false
            ),
            CompatMode::LimitedQuirks
        );
    }

    #[test]
    fn force_quirks_flag_wins() {
        assert_eq!(
            decide_compat_mode(Some("html"), None, None, true),
            CompatMode::Quirks
        );
    }
}
