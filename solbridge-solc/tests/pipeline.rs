//! compiles sources end to end with an in memory compiler

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use solbridge_solc::{
    error::Result, ConflictPolicy, CompilerInvoker, ProjectCompiler, SolcConfig, SolcError,
};
use std::cell::{Cell, RefCell};

const LIB: &str = r"C:\project\contracts\MathLib.sol";
const MAIN: &str = r"C:\project\contracts\Main.sol";

const LIB_SOURCE: &str = "pragma solidity ^0.5.0; library MathLib { \
                          function add(uint a, uint b) public pure returns (uint) { \
                          return a + b; } }";
const MAIN_SOURCE: &str = "pragma solidity ^0.5.0; import \"./MathLib.sol\"; \
                           contract Main { function run() public {} function add() public {} }";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A compiler that records its input and answers with a canned output
struct MockCompiler {
    version: String,
    output: Value,
    inputs: RefCell<Vec<Value>>,
    version_calls: Cell<usize>,
}

impl MockCompiler {
    fn new(output: Value) -> Self {
        Self {
            version: "0.5.0+commit.1d4f565a.Linux.g++".to_string(),
            output,
            inputs: RefCell::new(Vec::new()),
            version_calls: Cell::new(0),
        }
    }

    fn invocations(&self) -> usize {
        self.inputs.borrow().len()
    }

    fn last_input(&self) -> Value {
        self.inputs.borrow().last().cloned().unwrap()
    }
}

impl CompilerInvoker for MockCompiler {
    fn version(&self) -> Result<String> {
        self.version_calls.set(self.version_calls.get() + 1);
        Ok(self.version.clone())
    }

    fn compile_json(&self, input: &str) -> Result<String> {
        self.inputs.borrow_mut().push(serde_json::from_str(input)?);
        Ok(self.output.to_string())
    }
}

fn ast(path: &str, id: usize, contract: &str, functions: &[&str]) -> Value {
    let nodes: Vec<Value> = functions
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "id": id + 2 + i,
                "name": name,
                "nodeType": "FunctionDefinition",
                "src": "0:0:0"
            })
        })
        .collect();
    json!({
        "absolutePath": path,
        "id": id,
        "nodeType": "SourceUnit",
        "src": "0:100:0",
        "nodes": [
            {
                "id": id + 1,
                "name": contract,
                "nodeType": "ContractDefinition",
                "src": "24:76:0",
                "nodes": nodes
            }
        ]
    })
}

/// The output solc produces when only `Main.sol` is a target
fn compiler_output() -> Value {
    let function = |name: &str| {
        json!({
            "type": "function",
            "name": name,
            "inputs": [],
            "outputs": [],
            "stateMutability": "nonpayable"
        })
    };
    json!({
        "contracts": {
            "/C/project/contracts/MathLib.sol": {
                "MathLib": {"abi": [], "evm": {}}
            },
            "/C/project/contracts/Main.sol": {
                "Main": {
                    "abi": [function("add"), function("run")],
                    "metadata": "{\"compiler\":{\"version\":\"0.5.0+commit.1d4f565a\"}}",
                    "devdoc": {"methods": {}},
                    "userdoc": {"methods": {}},
                    "evm": {
                        "bytecode": {
                            "object": format!("6080{}6000", "0".repeat(40)),
                            "sourceMap": "24:76:1:-;;;",
                            "linkReferences": {
                                "/C/project/contracts/MathLib.sol": {
                                    "MathLib": [{"start": 2, "length": 20}]
                                }
                            }
                        },
                        "deployedBytecode": {
                            "object": "6080604052",
                            "sourceMap": "24:76:1:-;;",
                            "linkReferences": {}
                        }
                    }
                }
            }
        },
        "sources": {
            "/C/project/contracts/MathLib.sol": {
                "id": 0,
                "ast": ast("/C/project/contracts/MathLib.sol", 1, "MathLib", &["add"]),
                "legacyAST": {"name": "SourceUnit", "id": 1}
            },
            "/C/project/contracts/Main.sol": {
                "id": 1,
                "ast": ast("/C/project/contracts/Main.sol", 10, "Main", &["run", "add"]),
                "legacyAST": {"name": "SourceUnit", "id": 10}
            }
        }
    })
}

fn sources() -> Vec<(&'static str, &'static str)> {
    vec![(LIB, LIB_SOURCE), (MAIN, MAIN_SOURCE)]
}

fn diagnostic(severity: &str, message: &str) -> Value {
    let kind = if severity == "warning" { "Warning" } else { "ParserError" };
    json!({
        "component": "general",
        "formattedMessage": format!("/C/project/contracts/Main.sol:1:1: {}", message),
        "message": message,
        "severity": severity,
        "type": kind
    })
}

fn with_errors(errors: Vec<Value>) -> Value {
    let mut output = compiler_output();
    output["errors"] = Value::Array(errors);
    output
}

#[test]
fn can_compile_target_with_windows_paths() {
    init_tracing();
    let compiler = MockCompiler::new(compiler_output());
    let project = ProjectCompiler::new(&compiler, SolcConfig::default());

    let output = project.compile(sources(), &[MAIN]).unwrap();

    let input = compiler.last_input();
    assert_eq!(input["language"], "Solidity");
    assert_eq!(input["sources"]["/C/project/contracts/MathLib.sol"]["content"], LIB_SOURCE);
    assert_eq!(input["sources"]["/C/project/contracts/Main.sol"]["content"], MAIN_SOURCE);
    let selection = input["settings"]["outputSelection"].as_object().unwrap();
    assert_eq!(selection.len(), 2);
    assert_eq!(selection["*"], json!({"": ["legacyAST", "ast"]}));
    assert_eq!(selection["/C/project/contracts/Main.sol"][""], json!(["legacyAST", "ast"]));
    assert_eq!(
        selection["/C/project/contracts/Main.sol"]["*"],
        json!([
            "abi",
            "metadata",
            "evm.bytecode.object",
            "evm.bytecode.sourceMap",
            "evm.deployedBytecode.object",
            "evm.deployedBytecode.sourceMap",
            "userdoc",
            "devdoc"
        ])
    );
    assert_eq!(input["settings"]["optimizer"], json!({"enabled": false, "runs": 200}));
    assert!(input["settings"].get("evmVersion").is_none());

    assert_eq!(output.artifacts.len(), 1);
    let main = output.find("Main").unwrap();
    assert_eq!(main.source_path, MAIN);
    assert_eq!(main.source, MAIN_SOURCE);
    assert_eq!(main.compiler.name, "solc");
    assert_eq!(main.compiler.version, "0.5.0+commit.1d4f565a.Linux.g++");
    assert_eq!(
        main.abi.iter().map(|entry| entry.name.as_deref().unwrap()).collect::<Vec<_>>(),
        vec!["run", "add"]
    );
    assert_eq!(
        main.bytecode.as_resolved().unwrap(),
        format!("0x6080__MathLib{}6000", "_".repeat(31))
    );
    assert_eq!(main.deployed_bytecode.as_resolved(), Some("0x6080604052"));
    assert_eq!(main.source_map.as_deref(), Some("24:76:1:-;;;"));
    assert_eq!(main.legacy_ast, Some(json!({"name": "SourceUnit", "id": 10})));
    let emitted = &compiler_output()["sources"]["/C/project/contracts/Main.sol"]["ast"];
    assert_eq!(main.ast.as_ref(), Some(emitted));

    assert_eq!(output.source_indexes, vec![LIB.to_string(), MAIN.to_string()]);
    assert!(!output.has_warnings());
    assert_eq!(output.compiler_version.as_deref(), Some("0.5.0+commit.1d4f565a.Linux.g++"));
}

#[test]
fn compiles_everything_without_targets() {
    let compiler = MockCompiler::new(compiler_output());
    let project = ProjectCompiler::new(&compiler, SolcConfig::default());
    project.compile(sources(), &[] as &[&str]).unwrap();

    let selection = compiler.last_input()["settings"]["outputSelection"].clone();
    assert_eq!(selection.as_object().unwrap().len(), 1);
    assert!(selection["*"]["*"].is_array());
    assert_eq!(selection["*"][""], json!(["legacyAST", "ast"]));
}

#[test]
fn empty_input_does_not_invoke_compiler() {
    let compiler = MockCompiler::new(compiler_output());
    let project = ProjectCompiler::new(&compiler, SolcConfig::default());
    let output = project.compile(Vec::<(String, String)>::new(), &[MAIN]).unwrap();
    assert!(output.is_empty());
    assert!(output.source_indexes.is_empty());
    assert_eq!(output.compiler_version, None);
    assert_eq!(compiler.invocations(), 0);
    assert_eq!(compiler.version_calls.get(), 0);
}

#[test]
fn passes_configured_settings() {
    let config: SolcConfig = serde_json::from_value(json!({
        "settings": {"optimizer": {"enabled": true, "runs": 999}, "evmVersion": "byzantium"}
    }))
    .unwrap();
    let compiler = MockCompiler::new(compiler_output());
    ProjectCompiler::new(&compiler, config).compile(sources(), &[MAIN]).unwrap();

    let settings = compiler.last_input()["settings"].clone();
    assert_eq!(settings["optimizer"], json!({"enabled": true, "runs": 999}));
    assert_eq!(settings["evmVersion"], "byzantium");
    assert_eq!(settings["outputSelection"]["*"], json!({"": ["legacyAST", "ast"]}));
}

#[test]
fn warnings_do_not_abort() {
    let compiler = MockCompiler::new(with_errors(vec![
        diagnostic("warning", "Warning: Unused local variable."),
        diagnostic("warning", "Warning: Function state mutability can be restricted to pure"),
    ]));
    let output = ProjectCompiler::new(&compiler, SolcConfig::default())
        .compile(sources(), &[MAIN])
        .unwrap();
    assert_eq!(output.artifacts.len(), 1);
    assert_eq!(output.warnings.len(), 2);
    assert_eq!(
        output.warning_message(),
        "/C/project/contracts/Main.sol:1:1: Warning: Unused local variable.,\
         /C/project/contracts/Main.sol:1:1: Warning: Function state mutability can be restricted \
         to pure"
    );
}

#[test]
fn strict_mode_aborts_on_warnings() {
    let warning = diagnostic("warning", "Warning: Unused local variable.");
    let compiler = MockCompiler::new(with_errors(vec![warning]));
    let config = SolcConfig::builder().strict(true).build();
    let err = ProjectCompiler::new(&compiler, config).compile(sources(), &[MAIN]).unwrap_err();
    assert!(err.is_compilation());
    assert_eq!(
        err.to_string(),
        "/C/project/contracts/Main.sol:1:1: Warning: Unused local variable."
    );
}

#[test]
fn errors_abort_and_keep_warnings_out() {
    let compiler = MockCompiler::new(with_errors(vec![
        diagnostic("warning", "Warning: Unused local variable."),
        diagnostic("error", "ParserError: Expected ';' but got '}'"),
    ]));
    let err = ProjectCompiler::new(&compiler, SolcConfig::default())
        .compile(sources(), &[MAIN])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "/C/project/contracts/Main.sol:1:1: ParserError: Expected ';' but got '}'"
    );
}

#[test]
fn explains_version_mismatch() {
    let compiler = MockCompiler::new(with_errors(vec![diagnostic(
        "error",
        "ParserError: Source file requires different compiler version (current compiler is \
         0.5.0+commit.1d4f565a.Linux.g++ - note that nightly builds are considered to be \
         strictly less than the released version\npragma solidity ^0.4.24;\n\
         ^----------------------^",
    )]));
    let config = SolcConfig::builder().version("0.5.0").build();
    let err = ProjectCompiler::new(&compiler, config).compile(sources(), &[MAIN]).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("solc 0.5.0 is in use"), "{msg}");
    assert!(msg.contains("\"pragma solidity ^0.4.24\""), "{msg}");
}

#[test]
fn malformed_output_is_fatal() {
    struct Garbage;
    impl CompilerInvoker for Garbage {
        fn version(&self) -> Result<String> {
            Ok("0.5.0".to_string())
        }
        fn compile_json(&self, _: &str) -> Result<String> {
            Ok("<html>not json</html>".to_string())
        }
    }
    let err = ProjectCompiler::new(Garbage, SolcConfig::default())
        .compile(sources(), &[MAIN])
        .unwrap_err();
    assert!(matches!(err, SolcError::SerdeJson(_)));
}

#[test]
fn rejects_colliding_paths() {
    let compiler = MockCompiler::new(compiler_output());
    let config = SolcConfig::builder().conflict_policy(ConflictPolicy::Reject).build();
    let colliding = vec![(MAIN, MAIN_SOURCE), ("C:/project/contracts/Main.sol", MAIN_SOURCE)];
    let err = ProjectCompiler::new(&compiler, config).compile(colliding, &[MAIN]).unwrap_err();
    assert!(matches!(
        err,
        SolcError::DuplicateSource(ref path) if path == "/C/project/contracts/Main.sol"
    ));
    assert_eq!(compiler.invocations(), 0);
}

#[test]
fn can_compile_legacy_artifacts() {
    let compiler = MockCompiler::new(compiler_output());
    let contracts = ProjectCompiler::new(&compiler, SolcConfig::default())
        .compile_legacy(sources(), &[MAIN])
        .unwrap();
    assert_eq!(contracts.keys().collect::<Vec<_>>(), vec!["Main"]);

    let main = serde_json::to_value(&contracts["Main"]).unwrap();
    assert_eq!(main["contract_name"], "Main");
    assert_eq!(main["sourcePath"], MAIN);
    assert_eq!(main["unlinked_binary"], main["bytecode"]);
    assert_eq!(main["deployedBytecode"], "0x6080604052");
    assert_eq!(
        main["compiler"],
        json!({"name": "solc", "version": "0.5.0+commit.1d4f565a.Linux.g++"})
    );
    assert_eq!(main["abi"][0]["name"], "run");
}
