use crate::utils::{dash_join_lowercase, initials};

#[test]
fn initials_of_single_word() {
    assert_eq!(initials("drug"), "d");
    assert_eq!(initials("DRUG"), "d");
}

#[test]
fn initials_of_underscored_words() {
    assert_eq!(initials("drug_link"), "dl");
    assert_eq!(initials("a_b_c_d"), "abcd");
}

#[test]
fn initials_skip_empty_words_and_digits() {
    assert_eq!(initials("_drug__link_"), "dl");
    assert_eq!(initials("2fa_codes"), "fc");
}

#[test]
fn initials_fallback() {
    assert_eq!(initials(""), "t");
    assert_eq!(initials("__"), "t");
    assert_eq!(initials("123"), "t");
}

#[test]
fn dash_join() {
    assert_eq!(dash_join_lowercase(["A"]), "a");
    assert_eq!(dash_join_lowercase(["Drug_Id", "SEQ"]), "drug_id-seq");
    assert_eq!(dash_join_lowercase(Vec::<String>::new()), "");
}
