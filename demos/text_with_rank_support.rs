use bifmindex::text_with_rank_support::{Block64, FlatTextWithRankSupport, TextWithRankSupport};

fn main() {
    // This example shows how to directly use the TextWithRankSupport data structure
    // that powers the FM-index of this library. It assumes the input is already in
    // dense representation, i.e. symbols in `0..alphabet_size` with `0` reserved for
    // the sentinel.

    let text = vec![1u8, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4];
    let text_with_rank_support =
        FlatTextWithRankSupport::<i32, Block64>::construct(&text, 5);
    drop(text);

    let idx = 4;
    let symbol = 2;

    // Characters from the text can be recovered.
    assert_eq!(text_with_rank_support.symbol_at(idx), symbol);

    // The rank of a symbol is the number of occurrences of that symbol in the part of
    // the text before the given index, i.e. `text[..idx]`.
    assert_eq!(text_with_rank_support.rank(symbol, idx), 1);
}
