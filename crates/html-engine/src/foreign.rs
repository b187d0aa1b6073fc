//! Name and attribute adjustments applied when creating elements in the
//! MathML or SVG namespaces.
//!
//! @see https://html.spec.whatwg.org/#adjust-svg-attributes
//! @see https://html.spec.whatwg.org/#adjust-foreign-attributes
//! @see https://html.spec.whatwg.org/#adjust-svg-tag-name

use crate::atoms::Namespace;

/// SVG element names the tokenizer lowercases that the tree constructor
/// must restore to their mixed-case spelling.
pub fn adjust_svg_tag_name(name: &str) -> Box<str> {
    match name {
        "altglyph" => "altGlyph",
        "altglyphdef" => "altGlyphDef",
        "altglyphitem" => "altGlyphItem",
        "animatecolor" => "animateColor",
        "animatemotion" => "animateMotion",
        "animatetransform" => "animateTransform",
        "clippath" => "clipPath",
        "feblend" => "feBlend",
        "fecolormatrix" => "feColorMatrix",
        "fecomponenttransfer" => "feComponentTransfer",
        "fecomposite" => "feComposite",
        "feconvolvematrix" => "feConvolveMatrix",
        "fediffuselighting" => "feDiffuseLighting",
        "fedisplacementmap" => "feDisplacementMap",
        "fedistantlight" => "feDistantLight",
        "fedropshadow" => "feDropShadow",
        "feflood" => "feFlood",
        "fefunca" => "feFuncA",
        "fefuncb" => "feFuncB",
        "fefuncg" => "feFuncG",
        "fefuncr" => "feFuncR",
        "fegaussianblur" => "feGaussianBlur",
        "feimage" => "feImage",
        "femerge" => "feMerge",
        "femergenode" => "feMergeNode",
        "femorphology" => "feMorphology",
        "feoffset" => "feOffset",
        "fepointlight" => "fePointLight",
        "fespecularlighting" => "feSpecularLighting",
        "fespotlight" => "feSpotLight",
        "fetile" => "feTile",
        "feturbulence" => "feTurbulence",
        "foreignobject" => "foreignObject",
        "glyphref" => "glyphRef",
        "lineargradient" => "linearGradient",
        "radialgradient" => "radialGradient",
        "textpath" => "textPath",
        other => return other.into(),
    }
    .into()
}

/// Splits `xlink:*`, `xml:*`, and `xmlns*` attribute names into their
/// namespace, prefix, and local part. Applies regardless of which
/// foreign namespace the element is in.
pub fn adjust_foreign_attribute_name(name: &str) -> (Option<Namespace>, Option<Box<str>>, Box<str>) {
    match name {
        "xlink:actuate" => (Some(Namespace::Svg), Some("xlink".into()), "actuate".into()),
        "xlink:arcrole" => (Some(Namespace::Svg), Some("xlink".into()), "arcrole".into()),
        "xlink:href" => (Some(Namespace::Svg), Some("xlink".into()), "href".into()),
        "xlink:role" => (Some(Namespace::Svg), Some("xlink".into()), "role".into()),
        "xlink:show" => (Some(Namespace::Svg), Some("xlink".into()), "show".into()),
        "xlink:title" => (Some(Namespace::Svg), Some("xlink".into()), "title".into()),
        "xlink:type" => (Some(Namespace::Svg), Some("xlink".into()), "type".into()),
        "xml:lang" => (Some(Namespace::Svg), Some("xml".into()), "lang".into()),
        "xml:space" => (Some(Namespace::Svg), Some("xml".into()), "space".into()),
        "xmlns" => (Some(Namespace::Svg), None, "xmlns".into()),
        "xmlns:xlink" => (Some(Namespace::Svg), Some("xmlns".into()), "xlink".into()),
        other => (None, None, other.into()),
    }
}

/// SVG-specific camelCase attribute names the tokenizer lowercases.
pub fn adjust_svg_attribute_name(name: &str) -> Box<str> {
    match name {
        "attributename" => "attributeName",
        "attributetype" => "attributeType",
        "basefrequency" => "baseFrequency",
        "baseprofile" => "baseProfile",
        "calcmode" => "calcMode",
        "clippathunits" => "clipPathUnits",
        "diffuseconstant" => "diffuseConstant",
        "edgemode" => "edgeMode",
        "filterunits" => "filterUnits",
        "glyphref" => "glyphRef",
        "gradienttransform" => "gradientTransform",
        "gradientunits" => "gradientUnits",
        "kernelmatrix" => "kernelMatrix",
        "kernelunitlength" => "kernelUnitLength",
        "keypoints" => "keyPoints",
        "keysplines" => "keySplines",
        "keytimes" => "keyTimes",
        "lengthadjust" => "lengthAdjust",
        "limitingconeangle" => "limitingConeAngle",
        "markerheight" => "markerHeight",
        "markerunits" => "markerUnits",
        "markerwidth" => "markerWidth",
        "maskcontentunits" => "maskContentUnits",
        "maskunits" => "maskUnits",
        "numoctaves" => "numOctaves",
        "pathlength" => "pathLength",
        "patterncontentunits" => "patternContentUnits",
        "patterntransform" => "patternTransform",
        "patternunits" => "patternUnits",
        "pointsatx" => "pointsAtX",
        "pointsaty" => "pointsAtY",
        "pointsatz" => "pointsAtZ",
        "preservealpha" => "preserveAlpha",
        "preserveaspectratio" => "preserveAspectRatio",
        "primitiveunits" => "primitiveUnits",
        "refx" => "refX",
        "refy" => "refY",
        "repeatcount" => "repeatCount",
        "repeatdur" => "repeatDur",
        "requiredextensions" => "requiredExtensions",
        "requiredfeatures" => "requiredFeatures",
        "specularconstant" => "specularConstant",
        "specularexponent" => "specularExponent",
        "spreadmethod" => "spreadMethod",
        "startoffset" => "startOffset",
        "stddeviation" => "stdDeviation",
        "stitchtiles" => "stitchTiles",
        "surfacescale" => "surfaceScale",
        "systemlanguage" => "systemLanguage",
        "tablevalues" => "tableValues",
        "targetx" => "targetX",
        "targety" => "targetY",
        "textlength" => "textLength",
        "viewbox" => "viewBox",
        "viewtarget" => "viewTarget",
        "xchannelselector" => "xChannelSelector",
        "ychannelselector" => "yChannelSelector",
        "zoomandpan" => "zoomAndPan",
        other => return other.into(),
    }
    .into()
}

/// The lone MathML attribute-case fixup.
pub fn adjust_mathml_attribute_name(name: &str) -> Box<str> {
    if name == "definitionurl" {
        "definitionURL".into()
    } else {
        name.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_tag_name_restores_mixed_case() {
        assert_eq!(&*adjust_svg_tag_name("foreignobject"), "foreignObject");
        assert_eq!(&*adjust_svg_tag_name("rect"), "rect");
    }

    #[test]
    fn xlink_href_splits_into_namespace_and_local_name() {
        let (ns, prefix, local) = adjust_foreign_attribute_name("xlink:href");
        assert_eq!(ns, Some(Namespace::Svg));
        assert_eq!(prefix.as_deref(), Some("xlink"));
        assert_eq!(&*local, "href");
    }

    #[test]
    fn svg_attribute_case_fixup() {
        assert_eq!(&*adjust_svg_attribute_name("viewbox"), "viewBox");
    }
}
