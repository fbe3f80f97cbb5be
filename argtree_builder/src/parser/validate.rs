use std::collections::HashSet;

use crate::api::Argument;
use crate::matcher::Matches;
use crate::model::GroupKind;
use crate::parser::scope::Scope;
use crate::parser::{ParseError, Violations};

/// Check the cross-argument constraints of one command, routing every violation through its error mode.
pub(crate) fn validate(scope: &Scope, matches: &Matches) -> Result<(), ParseError> {
    let mut violations = Violations::new(scope.policy.error_mode);
    let checker = Checker { scope, matches };

    checker.conflicts(&mut violations)?;
    checker.dependencies(&mut violations)?;
    checker.requirements(&mut violations)?;
    checker.groups(&mut violations)?;
    checker.subcommand(&mut violations)?;

    violations.finish()
}

struct Checker<'s, 'a> {
    scope: &'s Scope<'a>,
    matches: &'s Matches,
}

impl<'s, 'a> Checker<'s, 'a> {
    fn own(&self) -> impl Iterator<Item = &'a Argument> {
        self.scope
            .command
            .arguments
            .iter()
            .filter(|a| !a.action.is_signal())
    }

    /// An argument is present when supplied by a non-default source; a group when any member is.
    fn present(&self, name: &str) -> bool {
        if self.scope.argument(name).is_some() {
            return self.matches.is_present(name);
        }

        match self.scope.command.groups.iter().find(|g| g.name == name) {
            Some(group) => group.members.iter().any(|m| self.matches.is_present(m)),
            None => self.matches.is_present(name),
        }
    }

    fn label(&self, name: &str) -> String {
        match self.scope.argument(name) {
            Some(argument) => argument.display(),
            None => name.to_string(),
        }
    }

    fn has_value(&self, name: &str, value: &str) -> bool {
        self.matches
            .values_of(name)
            .map_or(false, |values| values.iter().any(|v| v == value))
    }

    fn has_default(&self, argument: &Argument) -> bool {
        !argument.defaults.is_empty()
            || argument
                .default_value_if
                .iter()
                .any(|(peer, value, _)| self.has_value(peer, value))
    }

    fn conflicts(&self, violations: &mut Violations) -> Result<(), ParseError> {
        let mut reported: HashSet<(String, String)> = HashSet::default();

        for argument in self.own().filter(|a| self.present(&a.name)) {
            for peer in &argument.conflicts_with {
                if !self.present(peer) {
                    continue;
                }

                let pair = if argument.name <= *peer {
                    (argument.name.clone(), peer.clone())
                } else {
                    (peer.clone(), argument.name.clone())
                };

                if reported.insert(pair) {
                    violations.push(ParseError::Conflict {
                        name: argument.display(),
                        other: self.label(peer),
                    })?;
                }
            }
        }

        Ok(())
    }

    fn dependencies(&self, violations: &mut Violations) -> Result<(), ParseError> {
        for argument in self.own().filter(|a| self.present(&a.name)) {
            for peer in &argument.requires {
                if !self.present(peer) {
                    violations.push(ParseError::DependencyUnsatisfied {
                        name: argument.display(),
                        required: self.label(peer),
                    })?;
                }
            }

            for (peer, value) in &argument.requires_if {
                if self.has_value(&argument.name, value) && !self.present(peer) {
                    violations.push(ParseError::DependencyUnsatisfied {
                        name: argument.display(),
                        required: self.label(peer),
                    })?;
                }
            }
        }

        Ok(())
    }

    fn requirements(&self, violations: &mut Violations) -> Result<(), ParseError> {
        for argument in self.own() {
            if self.present(&argument.name) || self.has_default(argument) {
                continue;
            }

            // A positional slot which needs values is implicitly required.
            let required = argument.required
                || (argument.positional && argument.get_arity().min > 0)
                || (!argument.required_unless.is_empty()
                    && !argument.required_unless.iter().any(|p| self.present(p)))
                || argument
                    .required_if_eq
                    .iter()
                    .any(|(peer, value)| self.has_value(peer, value));

            if required {
                violations.push(ParseError::MissingRequiredArgument {
                    name: argument.display(),
                })?;
            }
        }

        Ok(())
    }

    fn groups(&self, violations: &mut Violations) -> Result<(), ParseError> {
        for group in &self.scope.command.groups {
            let (present, missing): (Vec<String>, Vec<String>) = group
                .members
                .iter()
                .cloned()
                .partition(|m| self.matches.is_present(m));

            match group.kind {
                GroupKind::MutuallyExclusive if present.len() > 1 => {
                    violations.push(ParseError::MutuallyExclusive {
                        group: group.name.clone(),
                        present,
                    })?;
                }
                GroupKind::RequiredTogether if !present.is_empty() && !missing.is_empty() => {
                    violations.push(ParseError::RequiredTogether {
                        group: group.name.clone(),
                        present,
                        missing,
                    })?;
                }
                GroupKind::RequiredTogether if present.is_empty() && group.required => {
                    violations.push(ParseError::RequiredTogether {
                        group: group.name.clone(),
                        present,
                        missing,
                    })?;
                }
                _ if present.is_empty() && group.required => {
                    violations.push(ParseError::AtLeastOne {
                        group: group.name.clone(),
                        members: group.members.clone(),
                    })?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn subcommand(&self, violations: &mut Violations) -> Result<(), ParseError> {
        let command = self.scope.command;

        if command.subcommand_required
            && !command.commands.is_empty()
            && self.matches.subcommand.is_none()
        {
            violations.push(ParseError::MissingSubcommand {
                command: self.scope.program(),
                available: command
                    .commands
                    .iter()
                    .filter(|c| !c.hidden)
                    .map(|c| c.name.clone())
                    .collect(),
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ArgGroup, Command};
    use crate::matcher::ArgMatch;
    use crate::model::{ErrorMode, ValueSource};
    use rstest::rstest;

    fn matches(present: &[(&str, &str)]) -> Matches {
        let mut matches = Matches::default();

        for (name, value) in present {
            matches.insert(ArgMatch::new(
                *name,
                vec![value.to_string()],
                1,
                ValueSource::CommandLine,
            ));
        }

        matches
    }

    fn check(command: &Command, present: &[(&str, &str)]) -> Result<(), ParseError> {
        validate(&Scope::root(command), &matches(present))
    }

    #[test]
    fn conflicts() {
        let command = Command::new("program")
            .add(Argument::flag("json").conflicts_with("yaml"))
            .add(Argument::flag("yaml").conflicts_with("json"))
            .add(Argument::flag("quiet").conflicts_with("output"))
            .add(Argument::flag("a"))
            .add(Argument::flag("b"))
            .group(ArgGroup::new("output").members(vec!["a", "b"]))
            .error_mode(ErrorMode::Aggregate);

        check(&command, &[("json", "true")]).unwrap();
        assert_eq!(
            check(&command, &[("json", "true"), ("yaml", "true")]).unwrap_err(),
            ParseError::Conflict {
                name: "--json".to_string(),
                other: "--yaml".to_string(),
            }
        );
        assert_eq!(
            check(&command, &[("quiet", "true"), ("b", "true")]).unwrap_err(),
            ParseError::Conflict {
                name: "--quiet".to_string(),
                other: "output".to_string(),
            }
        );
    }

    #[test]
    fn conflict_ignores_defaults() {
        let command = Command::new("program")
            .add(Argument::flag("json").conflicts_with("yaml"))
            .add(Argument::flag("yaml"));
        let mut matches = matches(&[("json", "true")]);
        matches.insert(ArgMatch::new(
            "yaml",
            vec!["false".to_string()],
            0,
            ValueSource::Default,
        ));

        validate(&Scope::root(&command), &matches).unwrap();
    }

    #[rstest]
    #[case(vec![("user", "x")], Some("--password"))]
    #[case(vec![("user", "x"), ("password", "y")], None)]
    #[case(vec![("mode", "tls")], Some("--cert"))]
    #[case(vec![("mode", "plain")], None)]
    #[case(vec![("mode", "tls"), ("cert", "c")], None)]
    fn dependencies(#[case] present: Vec<(&str, &str)>, #[case] required: Option<&str>) {
        let command = Command::new("program")
            .add(Argument::option("user").requires("password"))
            .add(Argument::option("password"))
            .add(Argument::option("mode").requires_if("cert", "tls"))
            .add(Argument::option("cert"));

        match required {
            None => check(&command, &present).unwrap(),
            Some(required) => assert_matches!(
                check(&command, &present).unwrap_err(),
                ParseError::DependencyUnsatisfied { required: actual, .. } if actual == required
            ),
        }
    }

    #[rstest]
    #[case(vec![], vec!["--name", "--token"])]
    #[case(vec![("name", "a")], vec!["--token"])]
    #[case(vec![("name", "a"), ("anonymous", "true")], vec![])]
    #[case(vec![("name", "a"), ("auth", "token")], vec!["--token"])]
    #[case(vec![("name", "a"), ("auth", "none"), ("anonymous", "true")], vec![])]
    fn requirements(#[case] present: Vec<(&str, &str)>, #[case] missing: Vec<&str>) {
        let command = Command::new("program")
            .error_mode(ErrorMode::Aggregate)
            .add(Argument::option("name").required(true))
            .add(Argument::option("region").required(true).default_value("us"))
            .add(Argument::option("token").required_unless("anonymous"))
            .add(Argument::option("key").required_if_eq("auth", "key"))
            .add(Argument::option("auth"))
            .add(Argument::flag("anonymous"));

        let errors: Vec<ParseError> = match check(&command, &present) {
            Ok(()) => Vec::default(),
            Err(ParseError::Aggregate(errors)) => errors,
            Err(error) => vec![error],
        };

        assert_eq!(
            errors,
            missing
                .iter()
                .map(|name| ParseError::MissingRequiredArgument {
                    name: name.to_string()
                })
                .collect::<Vec<ParseError>>()
        );
    }

    #[test]
    fn required_if_eq() {
        let command = Command::new("program")
            .add(Argument::option("key").required_if_eq("auth", "key"))
            .add(Argument::option("auth"));

        assert_eq!(
            check(&command, &[("auth", "key")]).unwrap_err(),
            ParseError::MissingRequiredArgument {
                name: "--key".to_string()
            }
        );
        check(&command, &[("auth", "key"), ("key", "k")]).unwrap();
    }

    #[rstest]
    #[case(vec![], None)]
    #[case(vec![("a", "true")], None)]
    #[case(vec![("a", "true"), ("c", "true")], Some(vec!["a", "c"]))]
    #[case(vec![("a", "true"), ("b", "true"), ("c", "true")], Some(vec!["a", "b", "c"]))]
    fn mutually_exclusive(
        #[case] present: Vec<(&str, &str)>,
        #[case] expected: Option<Vec<&str>>,
    ) {
        let command = Command::new("program")
            .add(Argument::flag("a"))
            .add(Argument::flag("b"))
            .add(Argument::flag("c"))
            .group(ArgGroup::mutually_exclusive("abc").members(vec!["a", "b", "c"]));

        match expected {
            None => check(&command, &present).unwrap(),
            Some(names) => assert_eq!(
                check(&command, &present).unwrap_err(),
                ParseError::MutuallyExclusive {
                    group: "abc".to_string(),
                    present: names.iter().map(|s| s.to_string()).collect(),
                }
            ),
        }
    }

    #[test]
    fn required_together() {
        let command = Command::new("program")
            .add(Argument::option("cluster"))
            .add(Argument::option("user"))
            .group(ArgGroup::required_together("login").members(vec!["cluster", "user"]));

        check(&command, &[]).unwrap();
        check(&command, &[("cluster", "c"), ("user", "u")]).unwrap();
        assert_eq!(
            check(&command, &[("cluster", "foo")]).unwrap_err(),
            ParseError::RequiredTogether {
                group: "login".to_string(),
                present: vec!["cluster".to_string()],
                missing: vec!["user".to_string()],
            }
        );

        let command = command.group(
            ArgGroup::required_together("required")
                .members(vec!["cluster", "user"])
                .required(true),
        );
        assert_matches!(
            check(&command, &[]).unwrap_err(),
            ParseError::RequiredTogether { present, missing, .. } if present.is_empty() && missing.len() == 2
        );
    }

    #[rstest]
    #[case(ArgGroup::at_least_one("g"))]
    #[case(ArgGroup::new("g").required(true))]
    #[case(ArgGroup::mutually_exclusive("g").required(true))]
    fn at_least_one(#[case] group: ArgGroup) {
        let command = Command::new("program")
            .add(Argument::flag("a"))
            .add(Argument::flag("b"))
            .group(group.members(vec!["a", "b"]));

        check(&command, &[("b", "true")]).unwrap();
        assert_eq!(
            check(&command, &[]).unwrap_err(),
            ParseError::AtLeastOne {
                group: "g".to_string(),
                members: vec!["a".to_string(), "b".to_string()],
            }
        );
    }

    #[test]
    fn missing_subcommand() {
        let command = Command::new("program")
            .subcommand_required(true)
            .subcommand(Command::new("add"))
            .subcommand(Command::new("debug").hidden(true))
            .subcommand(Command::new("remove"));

        assert_eq!(
            check(&command, &[]).unwrap_err(),
            ParseError::MissingSubcommand {
                command: "program".to_string(),
                available: vec!["add".to_string(), "remove".to_string()],
            }
        );
    }

    #[test]
    fn first_error() {
        let command = Command::new("program")
            .add(Argument::option("a").required(true))
            .add(Argument::option("b").required(true));

        assert_eq!(
            check(&command, &[]).unwrap_err(),
            ParseError::MissingRequiredArgument {
                name: "--a".to_string()
            }
        );
    }
}
