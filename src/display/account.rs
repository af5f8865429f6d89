//! Account display formatting
//!
//! Formats accounts for terminal output in table and detail views.

use crate::services::account::AccountSummary;

/// Format a list of accounts with balances as a table
pub fn format_account_list(summaries: &[AccountSummary]) -> String {
    if summaries.is_empty() {
        return "No accounts found.\n".to_string();
    }

    let name_width = summaries
        .iter()
        .map(|s| s.qualified_name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let type_width = summaries
        .iter()
        .map(|s| s.account.account_type().to_string().len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<type_width$}  {:>16}  {:<22}  {}\n",
        "Name", "Type", "Balance", "UID", "Flags",
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<type_width$}  {:->16}  {:-<22}  {:-<10}\n",
        "", "", "", "", "",
    ));

    for summary in summaries {
        output.push_str(&format!(
            "{:<name_width$}  {:<type_width$}  {:>16}  {:<22}  {}\n",
            summary.qualified_name,
            summary.account.account_type().to_string(),
            summary.balance.to_string(),
            summary.account.uid(),
            flags(summary),
        ));
    }

    output
}

fn flags(summary: &AccountSummary) -> String {
    let account = &summary.account;
    let mut flags = Vec::new();
    if account.is_favorite() {
        flags.push("*".to_string());
    }
    if account.is_placeholder() {
        flags.push("placeholder".to_string());
    }
    if summary.unexported_count > 0 {
        flags.push(format!("{} unexported", summary.unexported_count));
    }
    flags.join(", ")
}

/// Format a single account's details
pub fn format_account_details(summary: &AccountSummary) -> String {
    let account = &summary.account;
    let yes_no = |b: bool| if b { "Yes" } else { "No" };

    let mut output = String::new();
    output.push_str(&format!("Account: {}\n", summary.qualified_name));
    output.push_str(&format!("  UID:            {}\n", account.uid()));
    output.push_str(&format!(
        "  Type:           {} ({} normal balance)\n",
        account.account_type(),
        account.account_type().normal_balance()
    ));
    output.push_str(&format!("  Currency:       {}\n", account.currency()));
    if let Some(parent) = account.parent_uid() {
        output.push_str(&format!("  Parent:         {}\n", parent));
    }
    if let Some(transfer) = account.default_transfer_account_uid() {
        output.push_str(&format!("  Transfers to:   {}\n", transfer));
    }
    if let Some(color) = account.color_code() {
        output.push_str(&format!("  Color:          {}\n", color));
    }
    output.push_str(&format!("  Placeholder:    {}\n", yes_no(account.is_placeholder())));
    output.push_str(&format!("  Favorite:       {}\n", yes_no(account.is_favorite())));
    output.push_str(&format!("  Balance:        {}\n", summary.balance));
    output.push_str(&format!(
        "  Transactions:   {} ({} unexported)\n",
        summary.transaction_count, summary.unexported_count
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AccountType, Money};
    use rust_decimal_macros::dec;

    fn summary(name: &str, balance: rust_decimal::Decimal) -> AccountSummary {
        let mut account = Account::new(name);
        account.set_account_type(AccountType::Bank);
        account.set_favorite(true);
        AccountSummary {
            qualified_name: format!("Assets:{}", name),
            balance: Money::new(balance, account.currency().clone()),
            transaction_count: 3,
            unexported_count: 2,
            account,
        }
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_account_list(&[]), "No accounts found.\n");
    }

    #[test]
    fn test_list_rows() {
        let output = format_account_list(&[summary("Checking", dec!(4.50))]);
        assert!(output.contains("Assets:Checking"));
        assert!(output.contains("4.50 USD"));
        assert!(output.contains("*, 2 unexported"));
    }

    #[test]
    fn test_details() {
        let s = summary("Checking", dec!(-1.00));
        let output = format_account_details(&s);
        assert!(output.starts_with("Account: Assets:Checking\n"));
        assert!(output.contains(s.account.uid()));
        assert!(output.contains("Bank (Credit normal balance)"));
        assert!(output.contains("Transactions:   3 (2 unexported)"));
        assert!(!output.contains("Parent:"));
    }
}
