//! Closed enumerations for namespaces, tag names, and attribute names.
//!
//! HTML has a bounded vocabulary of element and attribute names that the
//! tree constructor must branch on constantly (special-category checks,
//! scope predicates, foreign-content adjustments). Interning those names
//! into an `Atom` makes those branches a cheap integer compare instead of
//! a byte-string compare, while names outside the closed set still parse
//! and round-trip as plain strings.
//!
//! This mirrors the atom/string duality described for `basic_html_atom` in
//! the original C++ implementation this crate descends from, but looks
//! names up in `phf` maps built at compile time rather than walking a
//! runtime-initialized table.

use std::fmt;

/// A namespace URI, using the fixed set defined by the Infra/DOM
/// specifications rather than an arbitrary string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Html,
    MathMl,
    Svg,
}

impl Namespace {
    pub fn uri(self) -> &'static str {
        match self {
            Namespace::Html => "http://www.w3.org/1999/xhtml",
            Namespace::MathMl => "http://www.w3.org/1998/Math/MathML",
            Namespace::Svg => "http://www.w3.org/2000/svg",
        }
    }
}

/// A tag name: either one of the well-known HTML/SVG/MathML element
/// names, interned as an [`Atom`], or an arbitrary unrecognized name
/// (custom elements, foreign markup this crate doesn't special-case).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocalName {
    Atom(Atom),
    Other(Box<str>),
}

impl LocalName {
    pub fn new(name: &str) -> Self {
        match TAG_ATOMS.get(name) {
            Some(&atom) => LocalName::Atom(atom),
            None => LocalName::Other(name.into()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LocalName::Atom(atom) => atom.as_str(),
            LocalName::Other(s) => s,
        }
    }

    pub fn is(&self, atom: Atom) -> bool {
        matches!(self, LocalName::Atom(a) if *a == atom)
    }
}

impl fmt::Display for LocalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for LocalName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for LocalName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Interned element or attribute name. Variants are named for their
/// canonical lowercase spelling; SVG/MathML names that browsers adjust to
/// mixed case (e.g. `foreignObject`) still compare through this atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Atom {
    a, abbr, address, applet, area, article, aside, audio,
    b, base, basefont, bdi, bdo, bgsound, blockquote, body, br, button,
    canvas, caption, center, cite, code, col, colgroup,
    data, datalist, dd, del, desc, details, dfn, dialog, dir, div, dl, dt,
    em, embed,
    fieldset, figcaption, figure, footer, form, foreignObject, frame, frameset,
    h1, h2, h3, h4, h5, h6, head, header, hgroup, hr, html,
    i, iframe, img, input, ins,
    kbd, keygen,
    label, legend, li, link, listing,
    main, map, mark, marquee, math, menu, meta, meter,
    mi, mn, mo, ms, mtext, annotation_xml,
    nav, noembed, noframes, noscript,
    object, ol, optgroup, option, output,
    p, param, picture, plaintext, pre, progress,
    q,
    rb, rp, rt, rtc, ruby,
    s, samp, script, section, select, slot, small, source, span, strong, style, sub, summary, sup, svg,
    table, tbody, td, template, textarea, tfoot, th, thead, time, title, tr, track,
    u, ul,
    var, video,
    wbr,
    xmp,

    // Attribute-only / shared names.
    class, id, style_attr, name, href, src, type_, value, rel, content, charset,
    color, face, size, width, height, align, clear,
    abp, definitionurl,
    xlink_actuate, xlink_arcrole, xlink_href, xlink_role, xlink_show, xlink_title, xlink_type,
    xml_lang, xml_space, xmlns, xmlns_xlink,
}

impl Atom {
    pub fn as_str(self) -> &'static str {
        match self {
            Atom::a => "a", Atom::abbr => "abbr", Atom::address => "address", Atom::applet => "applet", Atom::area => "area",
            Atom::article => "article", Atom::aside => "aside", Atom::audio => "audio",
            Atom::b => "b", Atom::base => "base", Atom::basefont => "basefont", Atom::bdi => "bdi", Atom::bdo => "bdo",
            Atom::bgsound => "bgsound",
            Atom::blockquote => "blockquote", Atom::body => "body", Atom::br => "br", Atom::button => "button",
            Atom::canvas => "canvas", Atom::caption => "caption", Atom::center => "center", Atom::cite => "cite", Atom::code => "code",
            Atom::col => "col", Atom::colgroup => "colgroup",
            Atom::data => "data", Atom::datalist => "datalist", Atom::dd => "dd", Atom::del => "del", Atom::desc => "desc",
            Atom::details => "details", Atom::dfn => "dfn", Atom::dialog => "dialog", Atom::dir => "dir", Atom::div => "div",
            Atom::dl => "dl", Atom::dt => "dt",
            Atom::em => "em", Atom::embed => "embed",
            Atom::fieldset => "fieldset", Atom::figcaption => "figcaption", Atom::figure => "figure",
            Atom::footer => "footer", Atom::form => "form", Atom::foreignObject => "foreignObject",
            Atom::frame => "frame", Atom::frameset => "frameset",
            Atom::h1 => "h1", Atom::h2 => "h2", Atom::h3 => "h3", Atom::h4 => "h4", Atom::h5 => "h5", Atom::h6 => "h6",
            Atom::head => "head", Atom::header => "header", Atom::hgroup => "hgroup", Atom::hr => "hr", Atom::html => "html",
            Atom::i => "i", Atom::iframe => "iframe", Atom::img => "img", Atom::input => "input", Atom::ins => "ins",
            Atom::kbd => "kbd", Atom::keygen => "keygen",
            Atom::label => "label", Atom::legend => "legend", Atom::li => "li", Atom::link => "link", Atom::listing => "listing",
            Atom::main => "main", Atom::map => "map", Atom::mark => "mark", Atom::marquee => "marquee",
            Atom::math => "math", Atom::menu => "menu", Atom::meta => "meta", Atom::meter => "meter",
            Atom::mi => "mi", Atom::mn => "mn", Atom::mo => "mo", Atom::ms => "ms", Atom::mtext => "mtext",
            Atom::annotation_xml => "annotation-xml",
            Atom::nav => "nav", Atom::noembed => "noembed", Atom::noframes => "noframes", Atom::noscript => "noscript",
            Atom::object => "object", Atom::ol => "ol", Atom::optgroup => "optgroup", Atom::option => "option",
            Atom::output => "output",
            Atom::p => "p", Atom::param => "param", Atom::picture => "picture", Atom::plaintext => "plaintext",
            Atom::pre => "pre", Atom::progress => "progress",
            Atom::q => "q",
            Atom::rb => "rb", Atom::rp => "rp", Atom::rt => "rt", Atom::rtc => "rtc", Atom::ruby => "ruby",
            Atom::s => "s", Atom::samp => "samp", Atom::script => "script", Atom::section => "section",
            Atom::select => "select", Atom::slot => "slot", Atom::small => "small", Atom::source => "source",
            Atom::span => "span", Atom::strong => "strong", Atom::style => "style", Atom::sub => "sub",
            Atom::summary => "summary", Atom::sup => "sup", Atom::svg => "svg",
            Atom::table => "table", Atom::tbody => "tbody", Atom::td => "td", Atom::template => "template",
            Atom::textarea => "textarea", Atom::tfoot => "tfoot", Atom::th => "th", Atom::thead => "thead",
            Atom::time => "time", Atom::title => "title", Atom::tr => "tr", Atom::track => "track",
            Atom::u => "u", Atom::ul => "ul",
            Atom::var => "var", Atom::video => "video",
            Atom::wbr => "wbr",
            Atom::xmp => "xmp",

            Atom::class => "class", Atom::id => "id", Atom::style_attr => "style", Atom::name => "name",
            Atom::href => "href", Atom::src => "src", Atom::type_ => "type", Atom::value => "value",
            Atom::rel => "rel", Atom::content => "content", Atom::charset => "charset",
            Atom::color => "color", Atom::face => "face", Atom::size => "size", Atom::width => "width",
            Atom::height => "height", Atom::align => "align", Atom::clear => "clear",
            Atom::abp => "abp", Atom::definitionurl => "definitionurl",
            Atom::xlink_actuate => "xlink:actuate", Atom::xlink_arcrole => "xlink:arcrole",
            Atom::xlink_href => "xlink:href", Atom::xlink_role => "xlink:role",
            Atom::xlink_show => "xlink:show", Atom::xlink_title => "xlink:title", Atom::xlink_type => "xlink:type",
            Atom::xml_lang => "xml:lang", Atom::xml_space => "xml:space",
            Atom::xmlns => "xmlns", Atom::xmlns_xlink => "xmlns:xlink",
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static TAG_ATOMS: phf::Map<&'static str, Atom> = phf::phf_map! {
    "a" => Atom::a, "abbr" => Atom::abbr, "address" => Atom::address, "applet" => Atom::applet, "area" => Atom::area,
    "article" => Atom::article, "aside" => Atom::aside, "audio" => Atom::audio,
    "b" => Atom::b, "base" => Atom::base, "basefont" => Atom::basefont, "bdi" => Atom::bdi, "bdo" => Atom::bdo,
    "bgsound" => Atom::bgsound,
    "blockquote" => Atom::blockquote, "body" => Atom::body, "br" => Atom::br, "button" => Atom::button,
    "canvas" => Atom::canvas, "caption" => Atom::caption, "center" => Atom::center, "cite" => Atom::cite, "code" => Atom::code,
    "col" => Atom::col, "colgroup" => Atom::colgroup,
    "data" => Atom::data, "datalist" => Atom::datalist, "dd" => Atom::dd, "del" => Atom::del, "desc" => Atom::desc,
    "details" => Atom::details, "dfn" => Atom::dfn, "dialog" => Atom::dialog, "dir" => Atom::dir, "div" => Atom::div,
    "dl" => Atom::dl, "dt" => Atom::dt,
    "em" => Atom::em, "embed" => Atom::embed,
    "fieldset" => Atom::fieldset, "figcaption" => Atom::figcaption, "figure" => Atom::figure,
    "footer" => Atom::footer, "form" => Atom::form, "foreignobject" => Atom::foreignObject,
    "frame" => Atom::frame, "frameset" => Atom::frameset,
    "h1" => Atom::h1, "h2" => Atom::h2, "h3" => Atom::h3, "h4" => Atom::h4, "h5" => Atom::h5, "h6" => Atom::h6,
    "head" => Atom::head, "header" => Atom::header, "hgroup" => Atom::hgroup, "hr" => Atom::hr, "html" => Atom::html,
    "i" => Atom::i, "iframe" => Atom::iframe, "img" => Atom::img, "input" => Atom::input, "ins" => Atom::ins,
    "kbd" => Atom::kbd, "keygen" => Atom::keygen,
    "label" => Atom::label, "legend" => Atom::legend, "li" => Atom::li, "link" => Atom::link, "listing" => Atom::listing,
    "main" => Atom::main, "map" => Atom::map, "mark" => Atom::mark, "marquee" => Atom::marquee,
    "math" => Atom::math, "menu" => Atom::menu, "meta" => Atom::meta, "meter" => Atom::meter,
    "mi" => Atom::mi, "mn" => Atom::mn, "mo" => Atom::mo, "ms" => Atom::ms, "mtext" => Atom::mtext,
    "annotation-xml" => Atom::annotation_xml,
    "nav" => Atom::nav, "noembed" => Atom::noembed, "noframes" => Atom::noframes, "noscript" => Atom::noscript,
    "object" => Atom::object, "ol" => Atom::ol, "optgroup" => Atom::optgroup, "option" => Atom::option,
    "output" => Atom::output,
    "p" => Atom::p, "param" => Atom::param, "picture" => Atom::picture, "plaintext" => Atom::plaintext,
    "pre" => Atom::pre, "progress" => Atom::progress,
    "q" => Atom::q,
    "rb" => Atom::rb, "rp" => Atom::rp, "rt" => Atom::rt, "rtc" => Atom::rtc, "ruby" => Atom::ruby,
    "s" => Atom::s, "samp" => Atom::samp, "script" => Atom::script, "section" => Atom::section,
    "select" => Atom::select, "slot" => Atom::slot, "small" => Atom::small, "source" => Atom::source,
    "span" => Atom::span, "strong" => Atom::strong, "style" => Atom::style, "sub" => Atom::sub,
    "summary" => Atom::summary, "sup" => Atom::sup, "svg" => Atom::svg,
    "table" => Atom::table, "tbody" => Atom::tbody, "td" => Atom::td, "template" => Atom::template,
    "textarea" => Atom::textarea, "tfoot" => Atom::tfoot, "th" => Atom::th, "thead" => Atom::thead,
    "time" => Atom::time, "title" => Atom::title, "tr" => Atom::tr, "track" => Atom::track,
    "u" => Atom::u, "ul" => Atom::ul,
    "var" => Atom::var, "video" => Atom::video,
    "wbr" => Atom::wbr,
    "xmp" => Atom::xmp,
};

/// Element names in the "special" category of the tree construction
/// algorithm, used by scope predicates and implied end tag handling.
///
/// @see https://html.spec.whatwg.org/#special
pub fn is_special(name: &LocalName, ns: Namespace) -> bool {
    use Atom::*;
    match ns {
        Namespace::Html => matches!(
            name,
            LocalName::Atom(
                address | applet | area | article | aside | base | basefont | bgsound | blockquote
                    | body | br | button | caption | center | col | colgroup | dd | details | dir
                    | div | dl | dt | embed | fieldset | figcaption | figure | footer | form
                    | frame | frameset | h1 | h2 | h3 | h4 | h5 | h6 | head | header | hgroup | hr
                    | html | iframe | img | input | keygen | li | link | listing | main | marquee
                    | menu | meta | nav | noembed | noframes | noscript | object | ol | p | param
                    | plaintext | pre | script | section | select | source | style | summary
                    | table | tbody | td | template | textarea | tfoot | th | thead | title | tr
                    | track | ul | wbr | xmp
            )
        ),
        Namespace::MathMl => matches!(name, LocalName::Atom(mi | mo | mn | ms | mtext | annotation_xml)),
        Namespace::Svg => matches!(name, LocalName::Atom(foreignObject | desc | title)),
    }
}
