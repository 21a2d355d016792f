use braviacontrol::Client;

/// Index of the client answering to `name`.
///
/// Names compare case-insensitively. An absent or unknown name falls back
/// to the first client; `None` only when `clients` is empty.
pub fn resolve_client(clients: &[Client], name: Option<&str>) -> Option<usize> {
    if clients.is_empty() {
        return None;
    }

    let wanted = name.map(str::trim).filter(|n| !n.is_empty());
    wanted
        .and_then(|wanted| {
            clients
                .iter()
                .position(|client| client.name().trim().eq_ignore_ascii_case(wanted))
        })
        .or(Some(0))
}

/// Configured televisions, in configuration order.
#[derive(Debug, Default)]
pub struct ClientCollection {
    clients: Vec<Client>,
}

impl ClientCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, client: Client) {
        self.clients.push(client);
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.clients.iter()
    }

    /// The default client.
    pub fn first(&self) -> Option<&Client> {
        self.clients.first()
    }

    pub fn get_client(&self, name: Option<&str>) -> Option<&Client> {
        resolve_client(&self.clients, name).map(|index| &self.clients[index])
    }

    pub fn get_client_mut(&mut self, name: Option<&str>) -> Option<&mut Client> {
        resolve_client(&self.clients, name).map(|index| &mut self.clients[index])
    }
}

impl FromIterator<Client> for ClientCollection {
    fn from_iter<T: IntoIterator<Item = Client>>(iter: T) -> Self {
        Self {
            clients: iter.into_iter().collect(),
        }
    }
}
