use std::collections::{HashMap, VecDeque};

const MAX_PENDING_COMMANDS: usize = 128;
const DEFAULT_GUILT_STEP: f32 = 5.0;
const DEFAULT_TIME_STEP_GAME_SECONDS: f32 = 60.0;
// Forced verdicts: 90 wins during play; 95 with a drained clock loses.
pub(crate) const FORCE_WIN_GUILT: f32 = 90.0;
pub(crate) const FORCE_LOSE_GUILT: f32 = 95.0;

/// Command destined for the game loop, which owns the director.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum GameCommand {
    Status,
    Start,
    Restart,
    ReturnToMenu,
    Pause,
    Resume,
    TogglePause,
    IncreaseGuilt { amount: f32 },
    DecreaseGuilt { amount: f32 },
    SetGuilt { percentage: f32 },
    AddTime { game_seconds: f32 },
    SubtractTime { game_seconds: f32 },
    ForceWin,
    ForceLose,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LocalAction {
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ParsedCommand {
    Local(LocalAction),
    Game(GameCommand),
}

#[derive(Debug, Clone, PartialEq)]
struct CommandParseError {
    reason: String,
    usage: String,
}

type ParseFn = dyn Fn(&[String]) -> Result<ParsedCommand, CommandParseError> + Send + Sync;

struct CommandSpec {
    name: String,
    help: String,
    arg_schema: String,
    parse: Box<ParseFn>,
}

struct CommandRegistry {
    specs: Vec<CommandSpec>,
    lookup_by_lower_name: HashMap<String, usize>,
}

impl CommandRegistry {
    fn new() -> Self {
        Self {
            specs: Vec::new(),
            lookup_by_lower_name: HashMap::new(),
        }
    }

    fn with_game_builtins() -> Self {
        type BuiltinParseFn = fn(&[String]) -> Result<ParsedCommand, CommandParseError>;
        const BUILTINS: &[(&str, &str, &str, BuiltinParseFn)] = &[
            ("help", "List commands", "", parse_help_command),
            ("status", "Print game status as JSON", "", parse_status_command),
            ("start", "Begin the interrogation", "", parse_start_command),
            ("restart", "Reset everything and start over", "", parse_restart_command),
            ("menu", "Return to the main menu", "", parse_menu_command),
            ("pause", "Pause the clock", "", parse_pause_command),
            ("resume", "Resume the clock", "", parse_resume_command),
            ("toggle", "Toggle the clock pause", "", parse_toggle_command),
            (
                "guilt_up",
                "Raise guilt (default 5)",
                "[amount:f32]",
                parse_guilt_up_command,
            ),
            (
                "guilt_down",
                "Lower guilt (default 5)",
                "[amount:f32]",
                parse_guilt_down_command,
            ),
            (
                "set_guilt",
                "Force the guilt meter",
                "<percentage:f32>",
                parse_set_guilt_command,
            ),
            (
                "time_add",
                "Add game seconds to the clock (default 60)",
                "[game_seconds:f32]",
                parse_time_add_command,
            ),
            (
                "time_sub",
                "Remove game seconds, ignores pause (default 60)",
                "[game_seconds:f32]",
                parse_time_sub_command,
            ),
            ("win", "Dev: drop guilt to the winning value", "", parse_win_command),
            ("lose", "Dev: max guilt and drain the clock", "", parse_lose_command),
            ("quit", "Exit the game", "", parse_quit_command),
        ];

        let mut registry = Self::new();
        for (name, help, arg_schema, parse) in BUILTINS {
            registry
                .register(*name, *help, *arg_schema, *parse)
                .expect("built-in command registration should not fail");
        }
        registry
    }

    fn register<F>(
        &mut self,
        name: impl Into<String>,
        help: impl Into<String>,
        arg_schema: impl Into<String>,
        parse: F,
    ) -> Result<(), String>
    where
        F: Fn(&[String]) -> Result<ParsedCommand, CommandParseError> + Send + Sync + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("command name cannot be empty".to_string());
        }
        let lower = name.to_ascii_lowercase();
        if self.lookup_by_lower_name.contains_key(&lower) {
            return Err(format!("duplicate command registration: {name}"));
        }

        self.specs.push(CommandSpec {
            name,
            help: help.into(),
            arg_schema: arg_schema.into(),
            parse: Box::new(parse),
        });
        self.lookup_by_lower_name.insert(lower, self.specs.len() - 1);
        Ok(())
    }

    fn lookup(&self, input_name: &str) -> Option<&CommandSpec> {
        let lower = input_name.to_ascii_lowercase();
        let index = self.lookup_by_lower_name.get(&lower)?;
        self.specs.get(*index)
    }

    // Help output order is registration order by contract.
    fn iter_specs_in_order(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.specs.iter().map(|spec| {
            (
                spec.name.as_str(),
                spec.help.as_str(),
                spec.arg_schema.as_str(),
            )
        })
    }
}

/// Turns raw console lines into queued [`GameCommand`]s, answering `help`
/// and malformed input with printable text on the spot.
pub(crate) struct ConsoleProcessor {
    registry: CommandRegistry,
    pending_commands: VecDeque<GameCommand>,
}

impl Default for ConsoleProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleProcessor {
    pub(crate) fn new() -> Self {
        Self {
            registry: CommandRegistry::with_game_builtins(),
            pending_commands: VecDeque::new(),
        }
    }

    pub(crate) fn process_line(&mut self, raw_line: &str) -> Vec<String> {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let tokens = trimmed
            .split_whitespace()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let command_name = &tokens[0];
        let args = &tokens[1..];

        let Some(spec) = self.registry.lookup(command_name) else {
            return vec![format!("error: unknown command '{command_name}'. try: help")];
        };

        match (spec.parse)(args) {
            Ok(ParsedCommand::Local(LocalAction::Help)) => self.help_lines(),
            Ok(ParsedCommand::Game(command)) => {
                self.push_pending(command);
                Vec::new()
            }
            Err(error) => {
                vec![format!("error: {}. usage: {}", error.reason, error.usage)]
            }
        }
    }

    pub(crate) fn drain_pending_into(&mut self, out: &mut Vec<GameCommand>) {
        out.extend(self.pending_commands.drain(..));
    }

    fn help_lines(&self) -> Vec<String> {
        self.registry
            .iter_specs_in_order()
            .map(|(name, help, arg_schema)| {
                if arg_schema.is_empty() {
                    format!("{name} - {help}")
                } else {
                    format!("{name} {arg_schema} - {help}")
                }
            })
            .collect()
    }

    fn push_pending(&mut self, command: GameCommand) {
        if self.pending_commands.len() == MAX_PENDING_COMMANDS {
            self.pending_commands.pop_front();
        }
        self.pending_commands.push_back(command);
    }
}

fn require_no_args(args: &[String], usage: &str) -> Result<(), CommandParseError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandParseError {
            reason: format!("{usage} takes no arguments"),
            usage: usage.to_string(),
        })
    }
}

fn parse_amount_arg(
    args: &[String],
    usage: &str,
    schema: &str,
    default: f32,
) -> Result<f32, CommandParseError> {
    match args {
        [] => Ok(default),
        [raw] => parse_finite_f32(raw, usage, schema),
        _ => Err(CommandParseError {
            reason: format!("expected at most one argument {schema}"),
            usage: format!("{usage} {schema}"),
        }),
    }
}

fn parse_finite_f32(raw: &str, usage: &str, schema: &str) -> Result<f32, CommandParseError> {
    let parsed = raw.parse::<f32>().map_err(|_| CommandParseError {
        reason: format!("invalid number '{raw}'"),
        usage: format!("{usage} {schema}"),
    })?;
    if !parsed.is_finite() {
        return Err(CommandParseError {
            reason: format!("number '{raw}' must be finite"),
            usage: format!("{usage} {schema}"),
        });
    }
    Ok(parsed)
}

fn parse_help_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "help")?;
    Ok(ParsedCommand::Local(LocalAction::Help))
}

fn parse_status_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "status")?;
    Ok(ParsedCommand::Game(GameCommand::Status))
}

fn parse_start_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "start")?;
    Ok(ParsedCommand::Game(GameCommand::Start))
}

fn parse_restart_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "restart")?;
    Ok(ParsedCommand::Game(GameCommand::Restart))
}

fn parse_menu_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "menu")?;
    Ok(ParsedCommand::Game(GameCommand::ReturnToMenu))
}

fn parse_pause_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "pause")?;
    Ok(ParsedCommand::Game(GameCommand::Pause))
}

fn parse_resume_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "resume")?;
    Ok(ParsedCommand::Game(GameCommand::Resume))
}

fn parse_toggle_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "toggle")?;
    Ok(ParsedCommand::Game(GameCommand::TogglePause))
}

fn parse_guilt_up_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let amount = parse_amount_arg(args, "guilt_up", "[amount:f32]", DEFAULT_GUILT_STEP)?;
    Ok(ParsedCommand::Game(GameCommand::IncreaseGuilt { amount }))
}

fn parse_guilt_down_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let amount = parse_amount_arg(args, "guilt_down", "[amount:f32]", DEFAULT_GUILT_STEP)?;
    Ok(ParsedCommand::Game(GameCommand::DecreaseGuilt { amount }))
}

fn parse_set_guilt_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let [raw] = args else {
        return Err(CommandParseError {
            reason: "expected exactly one argument <percentage>".to_string(),
            usage: "set_guilt <percentage:f32>".to_string(),
        });
    };
    let percentage = parse_finite_f32(raw, "set_guilt", "<percentage:f32>")?;
    Ok(ParsedCommand::Game(GameCommand::SetGuilt { percentage }))
}

fn parse_time_add_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let game_seconds = parse_amount_arg(
        args,
        "time_add",
        "[game_seconds:f32]",
        DEFAULT_TIME_STEP_GAME_SECONDS,
    )?;
    Ok(ParsedCommand::Game(GameCommand::AddTime { game_seconds }))
}

fn parse_time_sub_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let game_seconds = parse_amount_arg(
        args,
        "time_sub",
        "[game_seconds:f32]",
        DEFAULT_TIME_STEP_GAME_SECONDS,
    )?;
    Ok(ParsedCommand::Game(GameCommand::SubtractTime {
        game_seconds,
    }))
}

fn parse_win_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "win")?;
    Ok(ParsedCommand::Game(GameCommand::ForceWin))
}

fn parse_lose_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "lose")?;
    Ok(ParsedCommand::Game(GameCommand::ForceLose))
}

fn parse_quit_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "quit")?;
    Ok(ParsedCommand::Game(GameCommand::Quit))
}
