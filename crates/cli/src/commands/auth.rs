//! Session commands.

use rahat_core::Email;
use rahat_storefront::models::{LoginCredentials, RegisterData};
use rahat_storefront::{Storefront, StorefrontError};

/// Sign in and persist the token.
///
/// # Errors
///
/// Returns an error if the email is malformed or the credentials are refused.
#[allow(clippy::print_stdout)]
pub async fn login(
    storefront: &Storefront,
    email: &str,
    password: String,
) -> Result<(), StorefrontError> {
    let credentials = LoginCredentials::new(email, password)?;
    let user = storefront.session().login(credentials).await?;
    println!("Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

/// Create an account and sign in.
///
/// # Errors
///
/// Returns an error if the passwords differ, the email is malformed, or the
/// backend refuses the registration.
#[allow(clippy::print_stdout)]
pub async fn register(
    storefront: &Storefront,
    name: String,
    email: &str,
    password: String,
    password_confirmation: String,
) -> Result<(), StorefrontError> {
    let data = RegisterData {
        name,
        email: Email::parse(email)?,
        password: password.into(),
        password_confirmation: password_confirmation.into(),
    };
    let user = storefront.session().register(data).await?;
    println!("Registered and signed in as {} <{}>", user.name, user.email);
    Ok(())
}

/// Sign out. Never fails: local state is cleared even if the backend is down.
#[allow(clippy::print_stdout)]
pub async fn logout(storefront: &Storefront) {
    storefront.logout().await;
    println!("Signed out");
}

/// Show the signed-in user, tenant, and balance.
///
/// # Errors
///
/// Returns an error if the user or wallet could not be fetched.
#[allow(clippy::print_stdout)]
pub async fn whoami(storefront: &Storefront) -> Result<(), StorefrontError> {
    let Some(user) = storefront.session().current_user().await? else {
        println!("Not signed in");
        return Ok(());
    };

    let balance = storefront.wallet().balance().await?;
    let tenant = storefront.current_tenant();

    println!("{} <{}>", user.name, user.email);
    if !user.email_verified {
        println!("  email not verified");
    }
    println!("  tenant:  {}", tenant.name);
    println!("  balance: {}", storefront.display_price(balance));
    Ok(())
}
