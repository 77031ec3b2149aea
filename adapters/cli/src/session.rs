//! Interactive menu loop driving the world and the planning systems.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use log::debug;
use mission_control_core::{Command, Event, ObstacleKind, ObstacleSpec};
use mission_control_system_pathfinding::Pathfinder;
use mission_control_system_safe_directions::evaluate_safe_directions;
use mission_control_world::{self as world, query, World};
use thiserror::Error;

use crate::input::{self, InputError};

const MENU_HEADER: &str = "Select one of the following options";
const MENU_ACTIONS: &str = "d) Show safe directions\n\
                            m) Display obstacle map\n\
                            p) Find safe path\n\
                            x) Exit";
const ENTER_CODE: &str = "Enter code:";

/// Action selected from the main menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuOption {
    Place(ObstacleKind),
    ShowSafeDirections,
    DisplayMap,
    FindPath,
    Exit,
}

impl MenuOption {
    fn from_code(code: char) -> Option<Self> {
        match code {
            'd' => Some(Self::ShowSafeDirections),
            'm' => Some(Self::DisplayMap),
            'p' => Some(Self::FindPath),
            'x' => Some(Self::Exit),
            other => ObstacleKind::from_code(other).map(Self::Place),
        }
    }
}

/// Whether the loop keeps running after an action.
enum Flow {
    Continue,
    Stop,
}

/// Reasons an action ends before completing.
#[derive(Debug, Error)]
enum Interrupt {
    #[error("end of input")]
    EndOfInput,
    #[error(transparent)]
    Invalid(#[from] InputError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Console session owning the world for its whole lifetime.
pub(crate) struct Session<R, W> {
    input: R,
    output: W,
    world: World,
    pathfinder: Pathfinder,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Creates a session reading commands from `input` and replying on `output`.
    pub(crate) fn new(input: R, output: W, world: World, pathfinder: Pathfinder) -> Self {
        Self {
            input,
            output,
            world,
            pathfinder,
        }
    }

    /// Runs the menu loop until the operator exits or the input ends.
    pub(crate) fn run(&mut self) -> Result<()> {
        let mut show_menu = true;
        loop {
            if show_menu {
                self.print_menu().context("failed to print the menu")?;
            }

            let Some(line) = self.read_line().context("failed to read menu code")? else {
                return Ok(());
            };

            let code = match input::parse_option(&line) {
                Ok(code) => code,
                Err(error) => {
                    debug!("rejected menu code: {error:?}");
                    writeln!(self.output, "{error}\n{ENTER_CODE}")?;
                    show_menu = false;
                    continue;
                }
            };
            show_menu = true;

            let Some(option) = MenuOption::from_code(code) else {
                writeln!(self.output, "Invalid option.\n{ENTER_CODE}")?;
                continue;
            };

            match self.perform(option) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) | Err(Interrupt::EndOfInput) => return Ok(()),
                Err(Interrupt::Invalid(error)) => {
                    debug!("rejected input for {option:?}: {error:?}");
                    writeln!(self.output, "{error}")?;
                }
                Err(Interrupt::Io(error)) => {
                    return Err(error).with_context(|| format!("failed to perform {option:?}"));
                }
            }
        }
    }

    fn perform(&mut self, option: MenuOption) -> Result<Flow, Interrupt> {
        match option {
            MenuOption::Place(kind) => self.place(kind)?,
            MenuOption::ShowSafeDirections => self.show_safe_directions()?,
            MenuOption::DisplayMap => self.display_map()?,
            MenuOption::FindPath => self.find_path()?,
            MenuOption::Exit => return Ok(Flow::Stop),
        }
        Ok(Flow::Continue)
    }

    fn place(&mut self, kind: ObstacleKind) -> Result<(), Interrupt> {
        let spec = match kind {
            ObstacleKind::Guard => ObstacleSpec::Guard {
                position: self.prompt("Enter the guard's location (X,Y):", input::parse_coordinate)?,
            },
            ObstacleKind::Fence => ObstacleSpec::Fence {
                start: self.prompt(
                    "Enter the location where the fence starts (X,Y):",
                    input::parse_coordinate,
                )?,
                end: self.prompt(
                    "Enter the location where the fence ends (X,Y):",
                    input::parse_coordinate,
                )?,
            },
            ObstacleKind::Sensor => ObstacleSpec::Sensor {
                position: self.prompt("Enter the sensor's location (X,Y):", input::parse_coordinate)?,
                range: self.prompt("Enter the sensor's range (in klicks):", input::parse_distance)?,
            },
            ObstacleKind::Camera => ObstacleSpec::Camera {
                position: self.prompt("Enter the camera's location (X,Y):", input::parse_coordinate)?,
                facing: self.prompt(
                    "Enter the direction the camera is facing (n, s, e or w):",
                    input::parse_direction,
                )?,
            },
            ObstacleKind::Spotlight => ObstacleSpec::Spotlight {
                position: self.prompt(
                    "Enter the spotlight's location (X,Y):",
                    input::parse_coordinate,
                )?,
                facing: self.prompt(
                    "Enter the direction the spotlight is facing in (n, s, e or w):",
                    input::parse_direction,
                )?,
                range: self.prompt(
                    "Enter the spotlight's range (in klicks):",
                    input::parse_distance,
                )?,
            },
            ObstacleKind::Quicksand => ObstacleSpec::Quicksand {
                origin: self.prompt(
                    "Enter the position at the center of the quicksand (X,Y).",
                    input::parse_coordinate,
                )?,
                range: self.prompt(
                    "Enter the range of the quicksand (in klicks).",
                    input::parse_distance,
                )?,
                depth: self.prompt(
                    "Please enter the depth of the quicksand (in metres) to determine the difficulty to cross.",
                    input::parse_distance,
                )?,
            },
        };

        let mut events = Vec::new();
        world::apply(&mut self.world, Command::PlaceObstacle { spec }, &mut events);
        for event in events {
            if let Event::ObstaclePlacementRejected { reason, .. } = event {
                writeln!(self.output, "{reason}")?;
            }
        }
        Ok(())
    }

    fn show_safe_directions(&mut self) -> Result<(), Interrupt> {
        let position = self.prompt("Enter your current location (X,Y):", input::parse_coordinate)?;
        let report = evaluate_safe_directions(position, query::obstacles(&self.world));
        writeln!(self.output, "{}", report.message())?;
        Ok(())
    }

    fn display_map(&mut self) -> Result<(), Interrupt> {
        let top_left = self.prompt(
            "Enter the location of the top-left cell of the map (X,Y):",
            input::parse_coordinate,
        )?;
        let bottom_right = self.prompt(
            "Enter the location of the bottom-right cell of the map (X,Y):",
            input::parse_coordinate,
        )?;

        match query::grid(&self.world, top_left, bottom_right) {
            Ok(grid) => write!(self.output, "{grid}")?,
            Err(error) => writeln!(self.output, "{error}")?,
        }
        Ok(())
    }

    fn find_path(&mut self) -> Result<(), Interrupt> {
        let start = self.prompt("Enter your current location (X,Y):", input::parse_coordinate)?;
        let goal = self.prompt(
            "Enter the location of the mission objective (X,Y):",
            input::parse_coordinate,
        )?;

        let outcome = self
            .pathfinder
            .find_path(start, goal, query::obstacles(&self.world), None);
        writeln!(self.output, "{}", outcome.message())?;
        Ok(())
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "{MENU_HEADER}")?;
        for kind in query::obstacle_menu() {
            writeln!(self.output, "{}", kind.menu_entry())?;
        }
        writeln!(self.output, "{MENU_ACTIONS}\n{ENTER_CODE}")
    }

    fn prompt<T>(
        &mut self,
        question: &str,
        parse: fn(&str) -> Result<T, InputError>,
    ) -> Result<T, Interrupt> {
        writeln!(self.output, "{question}")?;
        let line = self.read_line()?.ok_or(Interrupt::EndOfInput)?;
        Ok(parse(&line)?)
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_script(script: &str) -> String {
        let mut output = Vec::new();
        let mut session = Session::new(
            script.as_bytes(),
            &mut output,
            World::with_seed(1),
            Pathfinder::default(),
        );
        session.run().expect("session completes");
        String::from_utf8(output).expect("utf-8 output")
    }

    #[test]
    fn menu_lists_obstacles_in_priority_order() {
        let output = run_script("");
        let expected = "Select one of the following options\n\
                        g) Add 'Guard' obstacle.\n\
                        f) Add 'Fence' obstacle.\n\
                        s) Add 'Sensor' obstacle.\n\
                        c) Add 'Camera' obstacle.\n\
                        l) Add 'Spotlight' obstacle.\n\
                        q) Add 'Quicksand' obstacle.\n\
                        d) Show safe directions\n\
                        m) Display obstacle map\n\
                        p) Find safe path\n\
                        x) Exit\n\
                        Enter code:\n";
        assert_eq!(output, expected);
    }

    #[test]
    fn guard_restricts_reported_directions() {
        let output = run_script("g\n3,2\nd\n3,3\nx\n");
        assert!(
            output.contains("You can safely take any of the following directions: SEW\n"),
            "unexpected output: {output}"
        );
    }

    #[test]
    fn malformed_code_hides_menu_until_next_action() {
        let output = run_script("gg\n");
        assert!(output.ends_with("Invalid input.\nEnter code:\n"));
        assert_eq!(output.matches(MENU_HEADER).count(), 1);
    }

    #[test]
    fn unknown_code_reprints_menu() {
        let output = run_script("z\nx\n");
        assert!(output.contains("Invalid option.\nEnter code:\n"));
        assert_eq!(output.matches(MENU_HEADER).count(), 2);
    }

    #[test]
    fn rejected_fence_reports_reason() {
        let output = run_script("f\n0,0\n1,1\n");
        assert!(output.contains("Fences must be horizontal or vertical.\n"));
    }

    #[test]
    fn invalid_range_returns_to_menu() {
        let output = run_script("s\n0,0\n-1\n");
        assert!(output.contains("Enter the sensor's range (in klicks):\nInvalid input.\n"));
        assert_eq!(output.matches(MENU_HEADER).count(), 2);
    }

    #[test]
    fn map_renders_placed_obstacles() {
        let output = run_script("g\n1,1\nm\n0,0\n2,2\n");
        assert!(output.contains("...\n.g.\n...\n"), "unexpected output: {output}");
    }

    #[test]
    fn inverted_map_corners_are_reported() {
        let output = run_script("m\n2,2\n0,0\n");
        assert!(output.contains("Invalid map specification.\n"));
    }

    #[test]
    fn oversized_map_is_refused() {
        let output = run_script("m\n-2147483648,0\n2147483647,0\nx\n");
        assert!(
            output.contains("Map is too large to display (4294967296 cells, at most 1048576).\n"),
            "unexpected output: {output}"
        );
        assert_eq!(output.matches(MENU_HEADER).count(), 2);
    }

    #[test]
    fn oversized_sensor_range_is_refused() {
        let output = run_script("s\n0,0\n1000000000\nd\n0,0\n");
        assert!(output.contains("Range must not exceed 1000 (got 1000000000).\n"));
        assert!(output.contains("You can safely take any of the following directions: NSEW\n"));
    }

    #[test]
    fn directions_at_plane_edge_skip_missing_neighbours() {
        let output = run_script("d\n2147483647,0\n");
        assert!(output.contains("You can safely take any of the following directions: NSW\n"));
    }

    #[test]
    fn path_search_prints_directions() {
        let output = run_script("p\n0,0\n0,2\n");
        assert!(output.contains("The following path will take you to the objective:\nSS\n"));
    }

    #[test]
    fn path_to_guarded_cell_is_refused() {
        let output = run_script("g\n5,5\np\n0,0\n5,5\n");
        assert!(output.contains("There is no safe path to the objective.\n"));
    }

    #[test]
    fn input_ending_mid_prompt_exits_cleanly() {
        let output = run_script("c\n0,0\n");
        assert!(output.ends_with("Enter the direction the camera is facing (n, s, e or w):\n"));
    }
}
