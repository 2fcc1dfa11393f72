//! Chess AI CLI
//!
//! Command-line interface to the engine.
//!
//! Two modes:
//! 1. One-shot commands: one command per invocation
//! 2. Server mode: long-running process speaking JSON lines on stdin/stdout

use chess_ai::{
    get_node_count, movegen::perft, reset_node_count, AIConfig, AIEngine, Board, ChessError,
    Color, Difficulty, EvalBreakdown, Evaluator, Move, DEFAULT_STRATEGY,
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "chess-ai")]
#[command(about = "Chess rules engine and alpha-beta AI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Position source: a FEN, or moves replayed from the initial position
#[derive(Args)]
struct PositionArgs {
    /// FEN string
    #[arg(long, conflicts_with = "moves")]
    fen: Option<String>,

    /// Space-separated coordinate moves from the start, e.g. "e2e4 e7e5"
    #[arg(long)]
    moves: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List legal moves
    Moves {
        #[command(flatten)]
        position: PositionArgs,

        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Choose a move
    Best {
        #[command(flatten)]
        position: PositionArgs,

        /// AI strategy (minimax)
        #[arg(long, default_value = DEFAULT_STRATEGY)]
        strategy: String,

        /// Search depth in plies
        #[arg(long, conflicts_with = "difficulty")]
        depth: Option<u32>,

        /// easy, medium or hard
        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Skip the opening book
        #[arg(long)]
        no_book: bool,

        /// Number of ranked moves to show (search only)
        #[arg(long, default_value = "1")]
        n: usize,

        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Game status and winner
    Status {
        #[command(flatten)]
        position: PositionArgs,

        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Static evaluation (positive favors White)
    Eval {
        #[command(flatten)]
        position: PositionArgs,

        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Count move-tree leaves
    Perft {
        /// Depth in plies
        #[arg(long, default_value = "3")]
        depth: u32,

        /// FEN string (default: initial position)
        #[arg(long)]
        fen: Option<String>,
    },

    /// Start server mode (stdin/stdout)
    Server,
}

#[derive(Serialize, Deserialize)]
struct MoveResult {
    #[serde(rename = "move")]
    mv: String,
    score: f64,
}

#[derive(Serialize)]
struct MovesResponse {
    moves: Vec<MoveResult>,
    total: usize,
}

// Server request and response
#[derive(Serialize, Deserialize, Default)]
struct ServerRequest {
    cmd: String,
    #[serde(default)]
    fen: Option<String>,
    #[serde(default)]
    moves: Option<Vec<String>>,
    #[serde(default, rename = "move")]
    mv: Option<String>,
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    depth: Option<u32>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    book: Option<bool>,
    #[serde(default)]
    n: Option<usize>,
}

#[derive(Serialize, Default)]
struct ServerResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none", rename = "move")]
    mv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<Vec<MoveResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    legal_moves: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    winner: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    eval: Option<EvalBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nodes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServerResponse {
    fn success() -> Self {
        Self {
            ok: true,
            ..Default::default()
        }
    }

    fn error(msg: &str) -> Self {
        Self {
            ok: false,
            error: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

fn print_json<T: Serialize>(value: &T, pretty: bool) {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match text {
        Ok(s) => println!("{}", s),
        Err(e) => fail(e),
    }
}

/// Build a board from a FEN or a move list; the initial position if neither
fn load_board(fen: Option<&str>, moves: &[String]) -> Result<Board, ChessError> {
    match fen {
        Some(fen) => {
            let mut board = Board::from_fen(fen)?;
            for text in moves {
                board.try_apply_move(Move::parse(text)?)?;
            }
            Ok(board)
        }
        None => Board::from_move_texts(moves),
    }
}

fn board_from_args(position: &PositionArgs) -> Board {
    let moves: Vec<String> = position
        .moves
        .as_deref()
        .map(|m| m.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();
    load_board(position.fen.as_deref(), &moves).unwrap_or_else(|e| fail(e))
}

fn legal_move_texts(board: &Board) -> Vec<String> {
    board
        .legal_moves(board.side_to_move())
        .iter()
        .map(Move::to_uci)
        .collect()
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Moves { position, json } => {
            let board = board_from_args(&position);
            let moves = legal_move_texts(&board);
            if json {
                print_json(&moves, true);
            } else {
                println!("Legal moves ({}):", moves.len());
                for mv in &moves {
                    println!("  {}", mv);
                }
            }
        }

        Commands::Best {
            position,
            strategy,
            depth,
            difficulty,
            seed,
            no_book,
            n,
            json,
        } => {
            let board = board_from_args(&position);
            let config = AIConfig {
                depth: depth
                    .or(difficulty.map(|d| d.depth()))
                    .unwrap_or(AIConfig::default().depth),
                seed,
                use_book: !no_book,
                ..Default::default()
            };
            let mut ai = AIEngine::from_strategy(&strategy, &config).unwrap_or_else(|e| fail(e));

            reset_node_count();
            let start = Instant::now();

            let ranked: Vec<MoveResult> = if n > 1 {
                ai.select_moves(&board, n)
                    .into_iter()
                    .map(|sm| MoveResult {
                        mv: sm.mv.to_uci(),
                        score: sm.score,
                    })
                    .collect()
            } else {
                ai.choose_move(&board)
                    .map(|mv| MoveResult {
                        mv: mv.to_uci(),
                        score: 0.0,
                    })
                    .into_iter()
                    .collect()
            };

            let elapsed = start.elapsed().as_secs_f64();
            let nodes = get_node_count();

            if json {
                let response = MovesResponse {
                    total: ranked.len(),
                    moves: ranked,
                };
                print_json(&response, true);
                eprintln!(
                    "Stats: depth={}, nodes={}, time={:.3}s",
                    config.depth, nodes, elapsed
                );
            } else if ranked.is_empty() {
                println!("No legal moves ({})", board.game_status());
            } else {
                println!("Best moves (strategy={}):", strategy);
                for r in &ranked {
                    println!("  {} (score: {:.2})", r.mv, r.score);
                }
                println!(
                    "\nStats: depth={}, nodes={}, time={:.3}s",
                    config.depth, nodes, elapsed
                );
            }
        }

        Commands::Status { position, json } => {
            let board = board_from_args(&position);
            let status = board.game_status();
            let winner = board.winner();
            if json {
                let response = ServerResponse {
                    status: Some(status.to_string()),
                    winner,
                    fen: Some(board.to_fen()),
                    ..ServerResponse::success()
                };
                print_json(&response, true);
            } else {
                println!("{}", board);
                println!("Status: {}", status);
                if let Some(w) = winner {
                    println!("Winner: {}", w);
                }
            }
        }

        Commands::Eval { position, json } => {
            let board = board_from_args(&position);
            let eval = Evaluator::new().breakdown(&board);
            if json {
                print_json(&eval, true);
            } else {
                println!("Evaluation (White's perspective): {:.2}", eval.total);
                println!("  material:       {:.2}", eval.material);
                println!("  position:       {:.2}", eval.position);
                println!("  pawn structure: {:.2}", eval.pawn_structure);
                println!("  king safety:    {:.2}", eval.king_safety);
                println!("  mobility:       {:.2}", eval.mobility);
            }
        }

        Commands::Perft { depth, fen } => {
            let mut board = load_board(fen.as_deref(), &[]).unwrap_or_else(|e| fail(e));
            let start = Instant::now();
            let nodes = perft(&mut board, depth);
            println!(
                "perft({}) = {} ({:.3}s)",
                depth,
                nodes,
                start.elapsed().as_secs_f64()
            );
        }

        Commands::Server => {
            run_server();
        }
    }
}

/// Server main loop
/// Reads one JSON request per line from stdin and writes one JSON response per line
fn run_server() {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        if line.trim().is_empty() {
            continue;
        }

        let request: ServerRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                print_json(&ServerResponse::error(&format!("Invalid JSON: {}", e)), false);
                let _ = stdout.flush();
                continue;
            }
        };

        if request.cmd == "quit" {
            break;
        }
        let response = handle_request(&request);
        print_json(&response, false);
        let _ = stdout.flush();
    }
}

fn handle_request(request: &ServerRequest) -> ServerResponse {
    let moves = request.moves.clone().unwrap_or_default();
    let board = match load_board(request.fen.as_deref(), &moves) {
        Ok(b) => b,
        Err(e) => return ServerResponse::error(&e.to_string()),
    };

    match request.cmd.as_str() {
        "best" => handle_best_request(request, &board),
        "moves" => ServerResponse {
            legal_moves: Some(legal_move_texts(&board)),
            ..ServerResponse::success()
        },
        "status" => ServerResponse {
            status: Some(board.game_status().to_string()),
            winner: board.winner(),
            fen: Some(board.to_fen()),
            ..ServerResponse::success()
        },
        "eval" => ServerResponse {
            eval: Some(Evaluator::new().breakdown(&board)),
            ..ServerResponse::success()
        },
        "apply" => handle_apply_request(request, board),
        _ => ServerResponse::error(&format!("Unknown command: {}", request.cmd)),
    }
}

fn handle_best_request(request: &ServerRequest, board: &Board) -> ServerResponse {
    let depth = match (request.depth, request.difficulty.as_deref()) {
        (Some(d), _) => d,
        (None, Some(name)) => match name.parse::<Difficulty>() {
            Ok(d) => d.depth(),
            Err(e) => return ServerResponse::error(&e),
        },
        (None, None) => AIConfig::default().depth,
    };
    let config = AIConfig {
        depth,
        seed: request.seed,
        use_book: request.book.unwrap_or(true),
        ..Default::default()
    };
    let strategy = request.strategy.as_deref().unwrap_or(DEFAULT_STRATEGY);
    let mut ai = match AIEngine::from_strategy(strategy, &config) {
        Ok(ai) => ai,
        Err(e) => return ServerResponse::error(&format!("Invalid strategy: {}", e)),
    };

    reset_node_count();
    let start = Instant::now();

    let mut response = ServerResponse::success();
    match request.n {
        Some(n) if n > 1 => {
            let ranked = ai
                .select_moves(board, n)
                .into_iter()
                .map(|sm| MoveResult {
                    mv: sm.mv.to_uci(),
                    score: sm.score,
                })
                .collect::<Vec<_>>();
            response.mv = ranked.first().map(|r| r.mv.clone());
            response.moves = Some(ranked);
        }
        _ => response.mv = ai.choose_move(board).map(|m| m.to_uci()),
    }

    response.depth = Some(depth);
    response.nodes = Some(get_node_count());
    response.elapsed_ms = Some(start.elapsed().as_secs_f64() * 1000.0);
    response
}

fn handle_apply_request(request: &ServerRequest, mut board: Board) -> ServerResponse {
    let Some(text) = request.mv.as_deref() else {
        return ServerResponse::error("apply needs a \"move\"");
    };
    let result = Move::parse(text).and_then(|mv| board.try_apply_move(mv));
    match result {
        Ok(_) => ServerResponse {
            fen: Some(board.to_fen()),
            status: Some(board.game_status().to_string()),
            winner: board.winner(),
            ..ServerResponse::success()
        },
        Err(e) => ServerResponse::error(&e.to_string()),
    }
}
