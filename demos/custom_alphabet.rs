use bifmindex::Alphabet;

fn main() {
    // This example shows how to build a custom alphabet, either with or without
    // ambiguous symbols. The dense symbol count is always one larger than the number
    // of searchable symbols, because dense symbol 0 is reserved for the sentinel that
    // terminates every indexed text.

    let mut digits_table = [255u8; 256];
    for (i, digit) in (b'0'..=b'9').enumerate() {
        digits_table[digit as usize] = (i + 1) as u8;
    }
    let digits = Alphabet::custom(digits_table, 11, 10);
    assert_eq!(digits.num_dense_symbols(), 11);
    assert_eq!(digits.num_searchable_dense_symbols(), 10);

    // An alphabet where both cases of a letter share one dense symbol, i.e. the
    // comparison is case-insensitive, the way `alphabet::ascii_dna` treats `A`/`a`.
    let mut roman_table = [255u8; 256];
    for (i, upper) in (b'A'..=b'Z').enumerate() {
        roman_table[upper as usize] = (i + 1) as u8;
        roman_table[upper.to_ascii_lowercase() as usize] = (i + 1) as u8;
    }
    let roman = Alphabet::custom(roman_table, 27, 26);
    assert_eq!(roman.num_dense_symbols(), 27);
    assert_eq!(roman.num_searchable_dense_symbols(), 26);
}
