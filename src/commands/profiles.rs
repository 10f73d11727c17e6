use anyhow::{Context, Result};
use clap::Args;

use crate::{
    config::{self, AwsPaths, ProfileSection},
    table::{self, TableRow},
};

#[derive(Debug, Clone, Args)]
pub struct ProfilesCommand {}

/// One line of the profile listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileListItem<'a> {
    pub name: &'a str,
    pub role: &'a str,
    pub region: &'a str,
}

impl<'a> From<&'a ProfileSection> for ProfileListItem<'a> {
    fn from(section: &'a ProfileSection) -> Self {
        Self {
            name: section.short_name(),
            role: &section.sso_role_name,
            region: &section.region,
        }
    }
}

impl TableRow for ProfileListItem<'_> {
    const HEADERS: &'static [&'static str] = &["name", "role", "region"];

    fn cells(&self) -> Vec<&str> {
        vec![self.name, self.role, self.region]
    }
}

impl ProfilesCommand {
    pub async fn execute(self) -> Result<()> {
        let paths = AwsPaths::from_env()?;
        let profiles = config::load_profiles(&paths.config)
            .await
            .context("Failed to list profiles")?;

        let mut rows: Vec<ProfileListItem> = profiles.values().map(ProfileListItem::from).collect();
        rows.sort_by(|a, b| a.name.cmp(b.name));

        print!("{}", table::render(&rows));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_item_from_section() {
        let profiles = config::parse_profiles(
            "[profile work]\nregion = eu-west-1\nsso_role_name = Developer\n",
        )
        .unwrap();
        let item = ProfileListItem::from(&profiles["profile work"]);

        assert_eq!(
            item,
            ProfileListItem {
                name: "work",
                role: "Developer",
                region: "eu-west-1",
            }
        );
    }

    #[test]
    fn test_listing_table() {
        let profiles = config::parse_profiles(
            "[default]\nregion = us-east-1\n\n[profile work]\nregion = eu-west-1\nsso_role_name = Developer\n",
        )
        .unwrap();
        let rows: Vec<ProfileListItem> = profiles.values().map(ProfileListItem::from).collect();

        let rendered = table::render(&rows);
        let lines: Vec<Vec<&str>> = rendered
            .lines()
            .map(|line| line.split_whitespace().collect())
            .collect();

        assert_eq!(
            lines,
            [
                vec!["NAME", "ROLE", "REGION"],
                vec!["default", "us-east-1"],
                vec!["work", "Developer", "eu-west-1"],
            ]
        );

        let region_column = rendered.find("REGION").unwrap();
        for (line, region) in rendered.lines().skip(1).zip(["us-east-1", "eu-west-1"]) {
            assert_eq!(&line[region_column..], region);
        }
    }
}
