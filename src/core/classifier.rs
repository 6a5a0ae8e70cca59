//! Source Classifier
//!
//! Decides whether verified Solidity source implements a token (ERC20-style
//! fungible or NFT) by matching characteristic declarations, function
//! signatures and events. Comments and string literals are stripped first so
//! documentation such as `// see ERC20 transfer()` does not count.

use lazy_static::lazy_static;
use regex::Regex;

/// Minimum number of canonical token functions required
const MIN_TOKEN_FUNCTIONS: usize = 4;

/// Minimum number of canonical token events required
const MIN_TOKEN_EVENTS: usize = 1;

lazy_static! {
    /// Line comments, block comments, and double/single quoted literals.
    /// One alternation so the leftmost construct wins (`"//"` stays a string).
    static ref COMMENTS_AND_STRINGS: Regex = Regex::new(
        r#"(?s)//[^\n]*|/\*.*?\*/|"(?:\\.|[^"\\\n])*"|'(?:\\.|[^'\\\n])*'"#
    ).expect("comment/string regex");

    /// `interface IERC20`, `contract ERC721 ...`, or `... is Ownable, ERC20Burnable {`
    static ref TOKEN_INTERFACE: Regex = Regex::new(
        r"(?i)(?:\b(?:interface|contract)\s+|\bis\s+[^{;]*?\b)I?(?:ERC|BEP)(?:20|721|777|1155|4626)\w*\b"
    ).expect("token interface regex");

    static ref TOKEN_FUNCTIONS: Vec<Regex> = [
        // transfer(address to, uint256 amount)
        r"\bfunction\s+transfer\s*\(\s*address\b[^,)]*,\s*uint(?:256)?\b[^)]*\)",
        // transferFrom(address from, address to, uint256 amount)
        r"\bfunction\s+transferFrom\s*\(\s*address\b[^,)]*,\s*address\b[^,)]*,\s*uint(?:256)?\b[^)]*\)",
        // balanceOf(address) or mapping(address => uint256) public balanceOf
        r"\bfunction\s+balanceOf\s*\(\s*address\b[^)]*\)|\bmapping\s*\(\s*address\s*=>\s*uint(?:256)?\s*\)\s*(?:public\s+)+(?:override\s+)?balanceOf\b",
        // approve(address spender, uint256 amount)
        r"\bfunction\s+approve\s*\(\s*address\b[^,)]*,\s*uint(?:256)?\b[^)]*\)",
        // allowance(address, address) or nested public mapping
        r"\bfunction\s+allowance\s*\(\s*address\b[^,)]*,\s*address\b[^)]*\)|\bmapping\s*\(\s*address\s*=>\s*mapping\s*\(\s*address\s*=>\s*uint(?:256)?\s*\)\s*\)\s*(?:public\s+)+(?:override\s+)?allowance\b",
        // totalSupply() or uint256 public totalSupply
        r"\bfunction\s+totalSupply\s*\(\s*\)|\buint(?:256)?\s+(?:public\s+)+(?:override\s+)?(?:immutable\s+)?totalSupply\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("token function regex"))
    .collect();

    static ref TOKEN_EVENTS: Vec<Regex> = [
        r"\bevent\s+Transfer\s*\(",
        r"\bevent\s+Approval\s*\(",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("token event regex"))
    .collect();
}

/// Replace comments and string literals with a single space
pub fn strip_comments_and_strings(source: &str) -> String {
    COMMENTS_AND_STRINGS.replace_all(source, " ").into_owned()
}

/// Returns true when `source` looks like a token contract.
///
/// Fails closed: empty or whitespace-only input (unverified contract) is
/// never a token.
pub fn is_token_contract(source: &str) -> bool {
    if source.trim().is_empty() {
        return false;
    }

    let code = strip_comments_and_strings(source);

    if TOKEN_INTERFACE.is_match(&code) {
        return true;
    }

    let functions = TOKEN_FUNCTIONS.iter().filter(|re| re.is_match(&code)).count();
    let events = TOKEN_EVENTS.iter().filter(|re| re.is_match(&code)).count();

    functions >= MIN_TOKEN_FUNCTIONS && events >= MIN_TOKEN_EVENTS
}

#[cfg(test)]
mod tests {
    use super::*;

    const HAND_ROLLED_TOKEN: &str = r#"
        pragma solidity ^0.8.0;
        contract Plain {
            uint256 private _supply;
            mapping(address => uint256) private _balances;
            event Transfer(address indexed from, address indexed to, uint256 value);
            function totalSupply() external view returns (uint256) { return _supply; }
            function balanceOf(address account) external view returns (uint256) { return _balances[account]; }
            function transfer(address to, uint256 amount) external returns (bool) { return true; }
            function transferFrom(address from, address to, uint256 amount) external returns (bool) { return true; }
            function approve(address spender, uint256 amount) external returns (bool) { return true; }
            function allowance(address owner, address spender) external view returns (uint256) { return 0; }
        }
    "#;

    #[test]
    fn test_empty_source_is_not_token() {
        assert!(!is_token_contract(""));
        assert!(!is_token_contract("   \n\t "));
    }

    #[test]
    fn test_full_signature_set_is_token() {
        assert!(is_token_contract(HAND_ROLLED_TOKEN));
    }

    #[test]
    fn test_three_functions_is_not_token() {
        let source = r#"
            contract Partial {
                event Transfer(address indexed from, address indexed to, uint256 value);
                function transfer(address to, uint256 amount) external returns (bool) { return true; }
                function balanceOf(address account) external view returns (uint256) { return 0; }
                function totalSupply() external view returns (uint256) { return 0; }
            }
        "#;
        assert!(!is_token_contract(source));
    }

    #[test]
    fn test_functions_without_event_is_not_token() {
        let source = HAND_ROLLED_TOKEN.replace(
            "event Transfer(address indexed from, address indexed to, uint256 value);",
            "",
        );
        assert!(!is_token_contract(&source));
    }

    #[test]
    fn test_inherited_interface_is_token() {
        let source = "contract Meme is Ownable, ERC20Burnable { constructor() {} }";
        assert!(is_token_contract(source));

        let lowercase = "contract Meme is erc20 { }";
        assert!(is_token_contract(lowercase));

        let nft = "interface IERC721 { }";
        assert!(is_token_contract(nft));
    }

    #[test]
    fn test_interface_in_comment_is_ignored() {
        let source = r#"
            // contract Fake is ERC20
            /* interface IERC20 { function transfer(address,uint256) } */
            contract Vault { string note = "contract X is ERC20"; }
        "#;
        assert!(!is_token_contract(source));
    }

    #[test]
    fn test_public_state_variable_getters_count() {
        let source = r#"
            contract Old {
                uint256 public totalSupply;
                mapping(address => uint256) public balanceOf;
                mapping(address => mapping(address => uint256)) public allowance;
                event Approval(address indexed owner, address indexed spender, uint256 value);
                function transfer(address _to, uint256 _value) public returns (bool success) { return true; }
            }
        "#;
        assert!(is_token_contract(source));
    }

    #[test]
    fn test_strip_keeps_code() {
        let stripped = strip_comments_and_strings("a = \"// not a comment\"; // real\nb = 1;");
        assert!(stripped.contains("a = "));
        assert!(stripped.contains("b = 1;"));
        assert!(!stripped.contains("real"));
        assert!(!stripped.contains("not a comment"));
    }
}
