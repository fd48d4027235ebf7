/*!
 * Tests for language utility functions
 */

use vidscribe::language_utils::{
    get_language_name, is_listed, language_codes_match, normalize_to_part1_or_part2t, normalize_to_part2t,
    validate_language_code,
};

#[test]
fn test_validateLanguageCode_withValidCodes_shouldSucceed() {
    for code in ["en", "fr", "eng", "fra", "fre", "ger", " EN ", "pt-BR"] {
        assert!(validate_language_code(code).is_ok(), "{} should be valid", code);
    }
}

#[test]
fn test_validateLanguageCode_withInvalidCodes_shouldFail() {
    for code in ["", "x", "xx", "e1g", "english"] {
        assert!(validate_language_code(code).is_err(), "{} should be invalid", code);
    }
}

#[test]
fn test_normalizeToPart2t_shouldMapEveryForm() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("DEU").unwrap(), "deu");
    assert!(normalize_to_part2t("zz").is_err());
}

#[test]
fn test_normalizeToPart1_shouldPreferTwoLetterCodes() {
    assert_eq!(normalize_to_part1_or_part2t("ger").unwrap(), "de");
    assert_eq!(normalize_to_part1_or_part2t("spa").unwrap(), "es");
    assert_eq!(normalize_to_part1_or_part2t("es-MX").unwrap(), "es");
}

#[test]
fn test_languageCodesMatch_acrossStandards() {
    assert!(language_codes_match("en", "eng"));
    assert!(language_codes_match("fr", "fre"));
    assert!(language_codes_match("de", "ger"));
    assert!(!language_codes_match("en", "fr"));
}

#[test]
fn test_getLanguageName_shouldReturnEnglishName() {
    assert_eq!(get_language_name("es").unwrap(), "Spanish");
    assert_eq!(get_language_name("fre").unwrap(), "French");
    assert!(get_language_name("qq").is_err());
}

#[test]
fn test_isListed_withConfiguredLanguages() {
    let listed: Vec<String> = ["en", "es", "fr"].iter().map(|c| c.to_string()).collect();
    assert!(is_listed(&listed, "es"));
    assert!(is_listed(&listed, " SPA "));
    assert!(is_listed(&listed, "fr-CA"));
    assert!(!is_listed(&listed, "de"));
    assert!(!is_listed(&listed, "xx"));
}
