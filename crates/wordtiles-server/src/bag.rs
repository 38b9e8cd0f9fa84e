//! Letter distribution and point values for dealt tiles.

use rand::Rng;
use rand::seq::SliceRandom;
use wordtiles_core::TileData;

/// How many copies of each letter go into a fresh bag.
pub const LETTER_COUNTS: [(char, usize); 26] = [
    ('A', 13), ('B', 3), ('C', 3), ('D', 6), ('E', 18), ('F', 3), ('G', 4),
    ('H', 3), ('I', 12), ('J', 2), ('K', 2), ('L', 5), ('M', 3), ('N', 8),
    ('O', 11), ('P', 3), ('Q', 2), ('R', 9), ('S', 6), ('T', 9), ('U', 6),
    ('V', 3), ('W', 3), ('X', 2), ('Y', 3), ('Z', 2),
];

const POINTS: [u32; 26] = [
    1, 3, 3, 2, 1, 4, 2, 4, 1, 8, 5, 1, 3, 1, 1, 3, 10, 1, 1, 1, 1, 4, 4, 8, 4, 10,
];

/// Point value of a letter; zero for anything that is not A-Z.
pub fn point_value(letter: char) -> u32 {
    let letter = letter.to_ascii_uppercase();
    if letter.is_ascii_uppercase() {
        POINTS[(letter as u8 - b'A') as usize]
    } else {
        0
    }
}

/// Every tile of a full bag, shuffled.
pub fn new_bag<R: Rng + ?Sized>(rng: &mut R) -> Vec<TileData> {
    let mut bag: Vec<TileData> = LETTER_COUNTS
        .iter()
        .flat_map(|&(letter, count)| std::iter::repeat_n(TileData::new(letter, point_value(letter)), count))
        .collect();
    bag.shuffle(rng);
    bag
}
