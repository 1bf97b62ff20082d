//! Race, class, role and profession enumerations

use ahash::AHashMap;
use once_cell::sync::Lazy;

pub const RACES: [&str; 8] = [
    "Human",
    "Dwarf",
    "Night Elf",
    "Gnome",
    "Orc",
    "Undead",
    "Tauren",
    "Troll",
];

pub const CLASSES: [&str; 9] = [
    "Warrior", "Paladin", "Hunter", "Rogue", "Priest", "Shaman", "Mage", "Warlock", "Druid",
];

pub const ROLES: [&str; 4] = ["Tank", "Healer", "Melee DPS", "Ranged DPS"];

/// Gathering and crafting professions; a character may hold at most
/// `MAX_PRIMARY_PROFESSIONS` of these
pub const PRIMARY_PROFESSIONS: [&str; 11] = [
    "Alchemy",
    "Blacksmithing",
    "Enchanting",
    "Engineering",
    "Herbalism",
    "Inscription",
    "Jewelcrafting",
    "Leatherworking",
    "Mining",
    "Skinning",
    "Tailoring",
];

pub const SECONDARY_PROFESSIONS: [&str; 4] = ["Cooking", "First Aid", "Fishing", "Survival"];

pub const MAX_PRIMARY_PROFESSIONS: usize = 2;

/// Which classes each race may play
static RACE_CLASSES: Lazy<AHashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut map: AHashMap<&'static str, &'static [&'static str]> = AHashMap::with_capacity(RACES.len());
    map.insert(
        "Human",
        &["Warrior", "Paladin", "Rogue", "Priest", "Mage", "Warlock"],
    );
    map.insert("Dwarf", &["Warrior", "Paladin", "Hunter", "Rogue", "Priest"]);
    map.insert("Night Elf", &["Warrior", "Hunter", "Rogue", "Priest", "Druid"]);
    map.insert("Gnome", &["Warrior", "Rogue", "Mage", "Warlock"]);
    map.insert("Orc", &["Warrior", "Hunter", "Rogue", "Shaman", "Warlock"]);
    map.insert("Undead", &["Warrior", "Rogue", "Priest", "Mage", "Warlock"]);
    map.insert("Tauren", &["Warrior", "Hunter", "Shaman", "Druid"]);
    map.insert(
        "Troll",
        &["Warrior", "Hunter", "Rogue", "Priest", "Shaman", "Mage"],
    );
    map
});

/// Lowercased name -> canonical spelling
static RACES_LOWER: Lazy<AHashMap<String, &'static str>> =
    Lazy::new(|| RACES.iter().map(|r| (r.to_lowercase(), *r)).collect());

static CLASSES_LOWER: Lazy<AHashMap<String, &'static str>> =
    Lazy::new(|| CLASSES.iter().map(|c| (c.to_lowercase(), *c)).collect());

/// Canonical spelling of a race, matched case-insensitively
pub fn canonical_race(name: &str) -> Option<&'static str> {
    RACES_LOWER.get(&name.trim().to_lowercase()).copied()
}

/// Canonical spelling of a class, matched case-insensitively
pub fn canonical_class(name: &str) -> Option<&'static str> {
    CLASSES_LOWER.get(&name.trim().to_lowercase()).copied()
}

/// Classes a race may play; takes the canonical race name
pub fn classes_for_race(race: &str) -> &'static [&'static str] {
    RACE_CLASSES.get(race).copied().unwrap_or(&[])
}

#[inline]
pub fn is_primary_profession(name: &str) -> bool {
    PRIMARY_PROFESSIONS.contains(&name)
}

#[inline]
pub fn is_profession(name: &str) -> bool {
    is_primary_profession(name) || SECONDARY_PROFESSIONS.contains(&name)
}
