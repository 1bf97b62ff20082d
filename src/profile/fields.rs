//! Character sheet field validators

use crate::catalog::{
    canonical_class, canonical_race, classes_for_race, is_primary_profession, is_profession,
    CLASSES, MAX_PRIMARY_PROFESSIONS, RACES, ROLES,
};
use crate::error::{GuildError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// http(s) URL with a domain, localhost or IPv4 host, optional port and path/query
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^https?://(?:(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,6}\.?|localhost|[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})(?::[0-9]+)?(?:/?|[/?]\S+)$",
    )
    .expect("URL pattern is valid")
});

/// Split comma-separated input into trimmed, non-empty entries
pub fn parse_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Exact-match race check
pub fn validate_race(name: &str) -> Result<()> {
    if RACES.contains(&name) {
        Ok(())
    } else {
        Err(GuildError::InvalidRace(name.to_string()))
    }
}

/// Exact-match class check
pub fn validate_class(name: &str) -> Result<()> {
    if CLASSES.contains(&name) {
        Ok(())
    } else {
        Err(GuildError::InvalidClass(name.to_string()))
    }
}

/// Case-insensitive race and class check, plus the compatibility matrix.
/// Returns the canonical spellings.
pub fn validate_race_class(race: &str, class: &str) -> Result<(&'static str, &'static str)> {
    let race_name = canonical_race(race).ok_or_else(|| GuildError::InvalidRace(race.to_string()))?;
    let class_name =
        canonical_class(class).ok_or_else(|| GuildError::InvalidClass(class.to_string()))?;

    if !classes_for_race(race_name).contains(&class_name) {
        return Err(GuildError::IncompatibleCombination {
            race: race_name.to_string(),
            class: class_name.to_string(),
        });
    }

    Ok((race_name, class_name))
}

/// At least one role, each from the fixed role list
pub fn validate_roles<S: AsRef<str>>(roles: &[S]) -> Result<()> {
    if roles.is_empty() {
        return Err(GuildError::NoRolesSelected);
    }
    for role in roles {
        let role = role.as_ref();
        if !ROLES.contains(&role) {
            return Err(GuildError::InvalidRole(role.to_string()));
        }
    }
    Ok(())
}

/// Comma-separated variant of `validate_roles`
pub fn validate_roles_text(text: &str) -> Result<()> {
    validate_roles(&parse_list(text))
}

/// Known professions only, at most two primary ones; empty is fine
pub fn validate_professions<S: AsRef<str>>(professions: &[S]) -> Result<()> {
    let mut primary = 0;
    for profession in professions {
        let profession = profession.as_ref();
        if !is_profession(profession) {
            return Err(GuildError::InvalidProfession(profession.to_string()));
        }
        if is_primary_profession(profession) {
            primary += 1;
        }
    }

    if primary > MAX_PRIMARY_PROFESSIONS {
        return Err(GuildError::TooManyPrimaryProfessions {
            count: primary,
            max: MAX_PRIMARY_PROFESSIONS,
        });
    }
    Ok(())
}

/// Comma-separated variant of `validate_professions`
pub fn validate_professions_text(text: &str) -> Result<()> {
    validate_professions(&parse_list(text))
}

/// Empty means "no URL given"; anything else must look like an http(s) URL
pub fn validate_url(url: &str) -> Result<()> {
    if url.is_empty() || URL_PATTERN.is_match(url) {
        Ok(())
    } else {
        Err(GuildError::InvalidUrlFormat(url.to_string()))
    }
}
